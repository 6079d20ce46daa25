//! Message rendering (Telegram HTML).

use chrono::{DateTime, Utc};
use teloxide::utils::html::escape;
use wallet_watch_core::{last_updated_text, ExchangeState, ExchangeStatus};

/// Reply to any command the bot does not know.
pub const UNKNOWN_COMMAND_REPLY: &str = "What?";

fn status_lines(status: &ExchangeStatus) -> String {
    match status {
        ExchangeStatus::Cryptopia { status } => {
            format!("<b>Status</b> <code>{}</code>\n", escape(status))
        }
        ExchangeStatus::HitBtc { deposit, withdraw } => format!(
            "<b>Deposit</b> <code>{}</code>\n<b>Withdraw</b> <code>{}</code>\n",
            deposit, withdraw
        ),
        ExchangeStatus::CoinExchange { wallet } => {
            format!("<b>Wallet</b> <code>{}</code>\n", escape(wallet))
        }
    }
}

/// Change notification for a single exchange.
pub fn format_wallet_update(state: &ExchangeState) -> String {
    format!(
        "<b>Wallet update</b>\n\n<b>{}</b>\n{}",
        state.exchange(),
        status_lines(&state.status)
    )
}

/// Full report of every exchange, answering the status command.
pub fn format_status_report(states: &[ExchangeState], now: DateTime<Utc>) -> String {
    states
        .iter()
        .map(|state| {
            format!(
                "<b>{}</b>\nLast updated {}\n{}",
                state.exchange(),
                last_updated_text(state.last_updated, now),
                status_lines(&state.status)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reply to a new (or repeated) subscription.
pub fn format_welcome(ticker: &str) -> String {
    format!(
        "<b>Welcome. You are on the notification list now!</b>\n\n\
         If any of the watched exchanges re-opens its {} wallet \
         you will receive a notification about it.\n\n\
         Use /status to see the current state.",
        escape(ticker)
    )
}
