//! Tracked asset definition.

use serde::{Deserialize, Serialize};

/// The single asset whose wallet status is monitored on every exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAsset {
    /// Ticker symbol (e.g., "SMART")
    pub ticker: String,
    /// Numeric currency id in Cryptopia's currency list
    pub cryptopia_currency_id: i64,
}

impl TrackedAsset {
    pub fn new(ticker: impl Into<String>, cryptopia_currency_id: i64) -> Self {
        Self {
            ticker: ticker.into(),
            cryptopia_currency_id,
        }
    }
}

impl Default for TrackedAsset {
    fn default() -> Self {
        Self::new("SMART", 582)
    }
}
