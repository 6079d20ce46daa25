//! Exchange identifiers and status endpoints.

use crate::TrackedAsset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange whose wallet status is watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// Status-by-id lookup in a currency list.
    Cryptopia,
    /// Deposit/withdraw flag pair.
    HitBtc,
    /// Wallet status string in a result envelope.
    CoinExchange,
}

impl Exchange {
    pub fn as_str(self) -> &'static str {
        match self {
            Exchange::Cryptopia => "Cryptopia",
            Exchange::HitBtc => "HitBTC",
            Exchange::CoinExchange => "Coinexchange",
        }
    }

    /// Public status endpoint for the tracked asset. GET, no auth.
    pub fn status_url(self, asset: &TrackedAsset) -> String {
        match self {
            Exchange::Cryptopia => "https://www.cryptopia.co.nz/api/GetCurrencies".to_string(),
            Exchange::HitBtc => format!(
                "https://api.hitbtc.com/api/2/public/currency/{}",
                asset.ticker
            ),
            Exchange::CoinExchange => format!(
                "https://www.coinexchange.io/api/v1/getcurrency?ticker_code={}",
                asset.ticker
            ),
        }
    }

    /// All watched exchanges, in status-report order.
    pub fn all() -> &'static [Exchange] {
        &[Exchange::Cryptopia, Exchange::HitBtc, Exchange::CoinExchange]
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
