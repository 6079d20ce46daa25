//! Exchange-specific extraction of tracked status fields from raw payloads.

use crate::{Exchange, ExchangeStatus, TrackedAsset};
use serde::Deserialize;
use thiserror::Error;

/// Reason a payload carried no usable status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Exchange reported failure")]
    Unsuccessful,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Ticker mismatch: expected {expected}, got {found}")]
    TickerMismatch { expected: String, found: String },
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::Malformed(err.to_string())
    }
}

/// Status string used when the tracked currency is absent from Cryptopia's list.
pub const UNKNOWN_STATUS: &str = "Unknown";

// ============================================================================
// Cryptopia
// ============================================================================

#[derive(Debug, Deserialize)]
struct CryptopiaResponse {
    #[serde(rename = "Success", default)]
    success: bool,
    /// Records stay untyped so foreign entries never fail the payload.
    #[serde(rename = "Data", default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct CryptopiaCurrency {
    #[serde(rename = "Status", default)]
    status: Option<String>,
}

fn extract_cryptopia(
    asset: &TrackedAsset,
    body: &serde_json::Value,
) -> Result<ExchangeStatus, ExtractError> {
    let resp = CryptopiaResponse::deserialize(body)?;

    if !resp.success {
        return Err(ExtractError::Unsuccessful);
    }
    let data = resp.data.ok_or(ExtractError::MissingField("Data"))?;

    // Last matching record wins
    let record = data.iter().rev().find(|record| {
        record.get("Id").and_then(serde_json::Value::as_i64) == Some(asset.cryptopia_currency_id)
    });

    let status = match record {
        Some(record) => CryptopiaCurrency::deserialize(record)?.status,
        None => None,
    }
    .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

    Ok(ExchangeStatus::Cryptopia { status })
}

// ============================================================================
// HitBTC
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HitBtcCurrency {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    payin_enabled: Option<bool>,
    #[serde(default)]
    payout_enabled: Option<bool>,
}

fn extract_hitbtc(
    asset: &TrackedAsset,
    body: &serde_json::Value,
) -> Result<ExchangeStatus, ExtractError> {
    let currency = HitBtcCurrency::deserialize(body)?;

    let id = currency.id.ok_or(ExtractError::MissingField("id"))?;
    if id != asset.ticker {
        return Err(ExtractError::TickerMismatch {
            expected: asset.ticker.clone(),
            found: id,
        });
    }

    Ok(ExchangeStatus::HitBtc {
        deposit: currency
            .payin_enabled
            .ok_or(ExtractError::MissingField("payinEnabled"))?,
        withdraw: currency
            .payout_enabled
            .ok_or(ExtractError::MissingField("payoutEnabled"))?,
    })
}

// ============================================================================
// Coinexchange
// ============================================================================

#[derive(Debug, Deserialize)]
struct CoinExchangeResponse {
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    result: Option<CoinExchangeCurrency>,
}

#[derive(Debug, Deserialize)]
struct CoinExchangeCurrency {
    #[serde(rename = "WalletStatus", default)]
    wallet_status: Option<String>,
}

fn extract_coinexchange(body: &serde_json::Value) -> Result<ExchangeStatus, ExtractError> {
    let resp = CoinExchangeResponse::deserialize(body)?;

    if resp.success.as_deref() != Some("1") {
        return Err(ExtractError::Unsuccessful);
    }
    let result = resp.result.ok_or(ExtractError::MissingField("result"))?;
    let wallet = result
        .wallet_status
        .ok_or(ExtractError::MissingField("WalletStatus"))?;

    Ok(ExchangeStatus::CoinExchange { wallet })
}

/// Extract the tracked status fields for `exchange` from a decoded payload.
///
/// An empty object (the marker for an undecodable body) always fails.
pub fn extract_status(
    exchange: Exchange,
    asset: &TrackedAsset,
    body: &serde_json::Value,
) -> Result<ExchangeStatus, ExtractError> {
    match exchange {
        Exchange::Cryptopia => extract_cryptopia(asset, body),
        Exchange::HitBtc => extract_hitbtc(asset, body),
        Exchange::CoinExchange => extract_coinexchange(body),
    }
}
