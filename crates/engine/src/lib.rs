//! Polling and change-detection engine.
//!
//! This crate holds the last-known state of every watched exchange, decides
//! which poll results are notify-worthy, and drives the polling schedule.

pub mod poller;
pub mod tracker;

pub use poller::*;
pub use tracker::*;
