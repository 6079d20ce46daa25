//! Subscriber store and Telegram delivery for wallet status changes.
//!
//! This crate provides:
//! - SQLite-based subscriber storage
//! - Fan-out of change notifications with failure handling
//! - Telegram bot command handling

pub mod commands;
pub mod db;
pub mod format;
pub mod notifier;
pub mod telegram;
pub mod transport;

pub use commands::CommandRouter;
pub use db::{Database, DbError, SubscriberId};
pub use notifier::{Delivery, DeliveryReport, Notifier};
pub use telegram::{Command, TelegramBot, TelegramError};
pub use transport::{SendError, TelegramTransport, Transport};
