//! Message transport and delivery failure classification.

use crate::db::SubscriberId;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::{ApiError, RequestError};
use thiserror::Error;

/// Why a message could not be delivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The recipient blocked or removed the bot. Permanent.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Timed out")]
    TimedOut,
    #[error("Network error: {0}")]
    Network(String),
    /// The chat moved to a new identity; nothing was delivered.
    #[error("Chat migrated to {0}")]
    ChatMigrated(SubscriberId),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<RequestError> for SendError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::MigrateToChatId(new_chat) => SendError::ChatMigrated(new_chat.0),
            RequestError::Api(api) => match api {
                ApiError::BotBlocked
                | ApiError::BotKicked
                | ApiError::BotKickedFromSupergroup
                | ApiError::UserDeactivated
                | ApiError::CantInitiateConversation
                | ApiError::CantTalkWithBots => SendError::Unauthorized(api.to_string()),
                // 403s without a dedicated variant
                ApiError::Unknown(ref desc) if desc.starts_with("Forbidden") => {
                    SendError::Unauthorized(desc.clone())
                }
                other => SendError::BadRequest(other.to_string()),
            },
            RequestError::Network(e) if e.is_timeout() => SendError::TimedOut,
            other => SendError::Network(other.to_string()),
        }
    }
}

/// Outbound message channel to a subscriber.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<(), SendError>;
}

/// Telegram Bot API transport. Messages are sent as HTML.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blocked_is_unauthorized() {
        let err: SendError = RequestError::Api(ApiError::BotBlocked).into();
        assert!(matches!(err, SendError::Unauthorized(_)));

        let err: SendError = RequestError::Api(ApiError::UserDeactivated).into();
        assert!(matches!(err, SendError::Unauthorized(_)));
    }

    #[test]
    fn test_unrecognized_forbidden_is_unauthorized() {
        let desc = "Forbidden: bot is not a member of the channel chat";
        let err: SendError = RequestError::Api(ApiError::Unknown(desc.to_string())).into();
        assert_eq!(err, SendError::Unauthorized(desc.to_string()));

        let err: SendError =
            RequestError::Api(ApiError::Unknown("Bad Request: message is too long".into())).into();
        assert!(matches!(err, SendError::BadRequest(_)));
    }

    #[test]
    fn test_migration_carries_new_id() {
        let err: SendError = RequestError::MigrateToChatId(ChatId(-1001234)).into();
        assert_eq!(err, SendError::ChatMigrated(-1001234));
    }

    #[test]
    fn test_other_api_errors_are_bad_request() {
        let err: SendError = RequestError::Api(ApiError::ChatNotFound).into();
        assert!(matches!(err, SendError::BadRequest(_)));
    }
}
