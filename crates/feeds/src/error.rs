//! Error types for status fetches.

use thiserror::Error;

/// Errors that can occur while fetching an exchange's status endpoint.
///
/// A non-200 response is not an error here; it resolves with its status code
/// so the tracker can log the payload alongside it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request pool closed")]
    PoolClosed,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::ConnectionFailed(err.to_string())
        }
    }
}

impl FetchError {
    /// Returns true if the next polling cycle is likely to succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::ConnectionFailed(_) | FetchError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient() {
        assert!(FetchError::Timeout("slow".into()).is_transient());
        assert!(FetchError::ConnectionFailed("reset".into()).is_transient());
        assert!(!FetchError::PoolClosed.is_transient());
        assert!(!FetchError::ClientBuild("tls".into()).is_transient());
    }
}
