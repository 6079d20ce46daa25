//! Telegram bot handlers.

use crate::commands::CommandRouter;
use crate::db::DbError;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Subscribe to wallet status notifications")]
    Start,
    #[command(description = "Show the current status of every exchange")]
    Status,
}

/// True for text that looks like a bot command.
fn is_command_text(text: &str) -> bool {
    text.starts_with('/')
}

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    router: Arc<CommandRouter>,
}

impl TelegramBot {
    /// Create a bot that routes commands through `router`.
    pub fn new(bot: Bot, router: Arc<CommandRouter>) -> Self {
        Self { bot, router }
    }

    /// Run the bot command handler until Ctrl+C.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();
        let commands = Arc::clone(&self);
        let unknown = Arc::clone(&self);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |msg: Message, cmd: Command| {
                        let this = Arc::clone(&commands);
                        async move { this.handle_command(msg, cmd).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().map(is_command_text).unwrap_or(false))
                    .endpoint(move |msg: Message| {
                        let this = Arc::clone(&unknown);
                        async move {
                            this.router.on_unknown_command(msg.chat.id.0).await;
                            Ok::<(), TelegramError>(())
                        }
                    }),
            );

        Dispatcher::builder(bot, handler)
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Ignoring update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(&self, msg: Message, cmd: Command) -> Result<(), TelegramError> {
        let chat_id = msg.chat.id.0;
        debug!(chat_id, command = ?cmd, "Command received");

        match cmd {
            Command::Start => {
                self.router.on_subscribe(chat_id).await?;
            }
            Command::Status => {
                self.router.on_status_query(chat_id).await;
            }
        }

        Ok(())
    }
}
