//! Core data types for the wallet status watcher.

pub mod age;
pub mod asset;
pub mod exchange;
pub mod extract;
pub mod status;

pub use age::*;
pub use asset::*;
pub use exchange::*;
pub use extract::*;
pub use status::*;
