//! HTTP client for exchange status endpoints.
//!
//! Every request goes through a shared semaphore so that overlapping polling
//! cycles never open more than a fixed number of connections.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;
use wallet_watch_core::{Exchange, TrackedAsset};

/// Resolved status request.
#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub exchange: Exchange,
    pub http_status: u16,
    /// Decoded JSON body, or an empty object when the body was not valid JSON.
    pub body: serde_json::Value,
}

impl StatusResponse {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.http_status == 200
    }
}

/// Source of raw exchange status payloads.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status payload of one exchange.
    async fn fetch_status(&self, exchange: Exchange) -> Result<StatusResponse, FetchError>;
}

/// Configuration for [`HttpStatusClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Upper bound on in-flight requests across all exchanges.
    pub max_concurrent_requests: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_concurrent_requests: 20,
        }
    }
}

/// Decode a response body, falling back to an empty object.
pub fn decode_body(exchange: Exchange, bytes: &[u8]) -> serde_json::Value {
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            debug!(exchange = %exchange, error = %e, "Undecodable status body");
            serde_json::Value::Object(serde_json::Map::new())
        }
    }
}

/// Status client backed by `reqwest`.
pub struct HttpStatusClient {
    client: Client,
    asset: TrackedAsset,
    permits: Arc<Semaphore>,
}

impl HttpStatusClient {
    /// Create a new client for the tracked asset.
    pub fn new(asset: TrackedAsset, config: &ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("wallet-watch")
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            asset,
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    pub fn asset(&self) -> &TrackedAsset {
        &self.asset
    }

    /// Number of requests that could start right now without waiting.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self, exchange: Exchange) -> Result<StatusResponse, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::PoolClosed)?;

        let url = exchange.status_url(&self.asset);
        debug!(exchange = %exchange, url = %url, "Fetching status");

        let resp = self.client.get(&url).send().await?;
        let http_status = resp.status().as_u16();
        let bytes = resp.bytes().await?;

        Ok(StatusResponse {
            exchange,
            http_status,
            body: decode_body(exchange, &bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_concurrent_requests, 20);
    }

    #[test]
    fn test_decode_body_valid_json() {
        let body = decode_body(Exchange::HitBtc, br#"{"id":"SMART"}"#);
        assert_eq!(body["id"], "SMART");
    }

    #[test]
    fn test_decode_body_invalid_json_is_empty_object() {
        let body = decode_body(Exchange::Cryptopia, b"<html>502 Bad Gateway</html>");
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn test_status_response_is_ok() {
        let resp = StatusResponse {
            exchange: Exchange::CoinExchange,
            http_status: 200,
            body: serde_json::json!({}),
        };
        assert!(resp.is_ok());

        let resp = StatusResponse {
            http_status: 503,
            ..resp
        };
        assert!(!resp.is_ok());
    }

    #[test]
    fn test_client_pool_capacity() {
        let config = ClientConfig {
            max_concurrent_requests: 7,
            ..Default::default()
        };
        let client = HttpStatusClient::new(TrackedAsset::default(), &config).unwrap();
        assert_eq!(client.available_permits(), 7);
        assert_eq!(client.asset().ticker, "SMART");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = ClientConfig {
            max_concurrent_requests: 0,
            ..Default::default()
        };
        let client = HttpStatusClient::new(TrackedAsset::default(), &config).unwrap();
        assert_eq!(client.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_hitbtc_status() {
        let client =
            HttpStatusClient::new(TrackedAsset::default(), &ClientConfig::default()).unwrap();
        // Should not panic, may fail due to network
        if let Ok(resp) = client.fetch_status(Exchange::HitBtc).await {
            assert_eq!(resp.exchange, Exchange::HitBtc);
        }
        assert_eq!(client.available_permits(), 20);
    }
}
