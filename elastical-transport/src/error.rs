//! Transport error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised while moving a request over the wire.
///
/// These never describe the remote engine's verdict on a request; a 4xx or
/// 5xx answer is a successful transport round-trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The underlying client or request could not be built.
    #[error("Failed to build request: {0}")]
    Build(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Map a reqwest error, folding timeouts and connect failures into
    /// their dedicated variants.
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Option<Duration>) -> Self {
        if error.is_timeout() {
            return Self::Timeout(timeout.unwrap_or_default());
        }
        if error.is_connect() {
            return Self::Connection(error.to_string());
        }
        if error.is_builder() {
            return Self::Build(error.to_string());
        }
        Self::Http(error)
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Http(e) if e.is_connect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        let err = TransportError::Timeout(Duration::from_millis(250));
        assert!(err.is_timeout());
        assert!(!err.is_connection());
        assert_eq!(err.to_string(), "Request timed out after 250ms");
    }

    #[test]
    fn test_connection_classification() {
        let err = TransportError::Connection("refused".to_string());
        assert!(err.is_connection());
        assert!(!err.is_timeout());
    }
}
