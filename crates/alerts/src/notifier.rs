//! Fan-out delivery to subscribers.
//!
//! Every outbound message, change notifications and command replies alike,
//! goes through [`Notifier::send_message`], which applies the reaction for
//! each delivery failure kind: blocked chats are unsubscribed, migrated chats
//! are re-keyed, everything else is logged and dropped.

use crate::db::{Database, DbError, SubscriberId};
use crate::format::format_wallet_update;
use crate::transport::{SendError, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wallet_watch_core::ExchangeState;
use wallet_watch_engine::ChangeNotifier;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Recipient is gone for good and was unsubscribed.
    Removed,
    /// Recipient moved to a new chat id, which now replaces the old one.
    Migrated(SubscriberId),
    /// Transient failure, recipient kept.
    Failed(SendError),
}

/// Tally of a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: u32,
    pub removed: u32,
    pub migrated: u32,
    pub failed: u32,
}

impl DeliveryReport {
    fn record(&mut self, delivery: &Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Removed => self.removed += 1,
            Delivery::Migrated(_) => self.migrated += 1,
            Delivery::Failed(_) => self.failed += 1,
        }
    }

    pub fn attempted(&self) -> u32 {
        self.delivered + self.removed + self.migrated + self.failed
    }
}

/// Delivers messages to subscribers and maintains the store on failures.
pub struct Notifier {
    db: Database,
    transport: Arc<dyn Transport>,
}

impl Notifier {
    /// Create a new notifier.
    pub fn new(db: Database, transport: Arc<dyn Transport>) -> Self {
        Self { db, transport }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Send one message and react to the failure kind, if any.
    pub async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Delivery {
        debug!(chat_id, "Sending message");

        match self.transport.send_message(chat_id, text).await {
            Ok(()) => Delivery::Delivered,
            Err(SendError::Unauthorized(reason)) => {
                warn!(chat_id, reason = %reason, "Subscriber unreachable, removing");
                if let Err(e) = self.db.remove(chat_id).await {
                    error!(chat_id, error = %e, "Failed to remove subscriber");
                }
                Delivery::Removed
            }
            Err(SendError::ChatMigrated(new_id)) => {
                warn!(chat_id, new_chat_id = new_id, "Chat migrated");
                match self.db.update(chat_id, new_id).await {
                    Ok(()) => {}
                    // Command replies may come from chats that never subscribed
                    Err(DbError::NotFound(_)) => {
                        debug!(chat_id, "Migrated chat was not subscribed");
                    }
                    Err(e) => {
                        error!(chat_id, new_chat_id = new_id, error = %e, "Failed to migrate subscriber");
                    }
                }
                Delivery::Migrated(new_id)
            }
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to send message");
                Delivery::Failed(e)
            }
        }
    }

    /// Send `text` to every subscriber in a fresh snapshot of the store.
    pub async fn broadcast(&self, text: &str) -> Result<DeliveryReport, DbError> {
        let subscribers = self.db.list().await?;
        let mut report = DeliveryReport::default();

        for chat_id in subscribers {
            let delivery = self.send_message(chat_id, text).await;
            report.record(&delivery);
        }

        Ok(report)
    }

    /// Announce one exchange's new state to every subscriber.
    pub async fn notify_change(&self, state: &ExchangeState) -> DeliveryReport {
        let exchange = state.exchange();
        let message = format_wallet_update(state);

        match self.broadcast(&message).await {
            Ok(report) => {
                info!(
                    exchange = %exchange,
                    delivered = report.delivered,
                    removed = report.removed,
                    migrated = report.migrated,
                    failed = report.failed,
                    "Wallet update sent"
                );
                report
            }
            Err(e) => {
                error!(exchange = %exchange, error = %e, "Failed to load subscribers");
                DeliveryReport::default()
            }
        }
    }
}

#[async_trait]
impl ChangeNotifier for Notifier {
    async fn notify(&self, state: &ExchangeState) {
        self.notify_change(state).await;
    }
}
