//! Exchange status fetching.
//!
//! This crate provides the outbound side of the watcher: one non-blocking
//! GET per exchange per polling cycle, bounded by a shared request pool.

pub mod client;
pub mod error;

pub use client::{decode_body, ClientConfig, HttpStatusClient, StatusResponse, StatusSource};
pub use error::*;
