//! Application configuration.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use wallet_watch_core::TrackedAsset;
use wallet_watch_feeds::ClientConfig;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("No bot token configured (set {BOT_TOKEN_ENV} or bot_token)")]
    MissingToken,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Asset watched on every exchange.
    pub asset: TrackedAsset,
    /// Seconds between polling cycles.
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound on in-flight status requests.
    pub max_concurrent_requests: usize,
    /// Telegram bot token. The environment takes precedence.
    pub bot_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset: TrackedAsset::default(),
            poll_interval_secs: 60,
            request_timeout_secs: 10,
            max_concurrent_requests: 20,
            bot_token: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: display,
                    source,
                })
            }
        };

        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Pick the bot token: the environment value wins over the file.
    pub fn resolve_token(&self, env_token: Option<String>) -> Result<String, ConfigError> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.bot_token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
            })
            .ok_or(ConfigError::MissingToken)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}
