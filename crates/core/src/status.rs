//! Per-exchange wallet status and last-known state.

use crate::Exchange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracked status fields. The shape depends on what each exchange reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "exchange", rename_all = "snake_case")]
pub enum ExchangeStatus {
    Cryptopia { status: String },
    HitBtc { deposit: bool, withdraw: bool },
    CoinExchange { wallet: String },
}

impl ExchangeStatus {
    /// Status before the first successful poll.
    pub fn initial(exchange: Exchange) -> Self {
        match exchange {
            Exchange::Cryptopia => ExchangeStatus::Cryptopia {
                status: "Maintenance".to_string(),
            },
            Exchange::HitBtc => ExchangeStatus::HitBtc {
                deposit: false,
                withdraw: false,
            },
            Exchange::CoinExchange => ExchangeStatus::CoinExchange {
                wallet: "offline".to_string(),
            },
        }
    }

    pub fn exchange(&self) -> Exchange {
        match self {
            ExchangeStatus::Cryptopia { .. } => Exchange::Cryptopia,
            ExchangeStatus::HitBtc { .. } => Exchange::HitBtc,
            ExchangeStatus::CoinExchange { .. } => Exchange::CoinExchange,
        }
    }
}

/// Last-known state of one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeState {
    pub status: ExchangeStatus,
    /// Time of the last successful poll, `None` until one succeeds.
    pub last_updated: Option<DateTime<Utc>>,
}

impl ExchangeState {
    pub fn initial(exchange: Exchange) -> Self {
        Self {
            status: ExchangeStatus::initial(exchange),
            last_updated: None,
        }
    }

    #[inline]
    pub fn exchange(&self) -> Exchange {
        self.status.exchange()
    }

    /// Overwrite the tracked fields and stamp the update time.
    ///
    /// Returns true when the tracked fields changed.
    pub fn apply(&mut self, status: ExchangeStatus, now: DateTime<Utc>) -> bool {
        debug_assert_eq!(status.exchange(), self.exchange());
        let changed = self.status != status;
        self.status = status;
        self.last_updated = Some(now);
        changed
    }
}
