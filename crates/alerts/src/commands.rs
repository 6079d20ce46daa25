//! Inbound bot actions.

use crate::db::{DbError, SubscriberId};
use crate::format::{format_status_report, format_welcome, UNKNOWN_COMMAND_REPLY};
use crate::notifier::{Delivery, Notifier};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use wallet_watch_engine::StateTracker;

/// Handles the three actions a chat can trigger.
pub struct CommandRouter {
    notifier: Arc<Notifier>,
    tracker: Arc<StateTracker>,
}

impl CommandRouter {
    pub fn new(notifier: Arc<Notifier>, tracker: Arc<StateTracker>) -> Self {
        Self { notifier, tracker }
    }

    /// Enroll the chat and send the welcome text.
    pub async fn on_subscribe(&self, chat_id: SubscriberId) -> Result<Delivery, DbError> {
        self.notifier.db().add(chat_id).await?;
        info!(chat_id, "Subscribed");

        let text = format_welcome(&self.tracker.asset().ticker);
        Ok(self.notifier.send_message(chat_id, &text).await)
    }

    /// Reply with the current state of every exchange.
    pub async fn on_status_query(&self, chat_id: SubscriberId) -> Delivery {
        let report = format_status_report(&self.tracker.snapshot(), Utc::now());
        self.notifier.send_message(chat_id, &report).await
    }

    pub async fn on_unknown_command(&self, chat_id: SubscriberId) -> Delivery {
        self.notifier
            .send_message(chat_id, UNKNOWN_COMMAND_REPLY)
            .await
    }
}
