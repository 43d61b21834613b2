//! Error types for client operations.

use elastical_transport::{StatusCode, TransportError, TransportRequest};
use thiserror::Error;

use crate::response::Payload;

/// Client error type.
#[derive(Error, Debug)]
pub enum ElasticalError {
    /// Network or timeout failure reported by the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx response.
    #[error("{message}")]
    Http {
        /// Response status.
        status: StatusCode,
        /// Server-supplied error message, or `HTTP <status>`.
        message: String,
        /// Parsed response body.
        body: Payload,
    },

    /// Shard-level failure reported inside a 2xx response.
    #[error("{failed} shard(s) failed: {joined}", joined = .reasons.join("; "))]
    PartialFailure {
        /// Number of failed shards.
        failed: u64,
        /// Per-shard failure reasons.
        reasons: Vec<String>,
        /// Parsed response body.
        body: Payload,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured endpoint does not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Malformed operation input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A request hook captured the request instead of sending it.
    #[error("Request intercepted: {} {}", .0.method, .0.url)]
    Intercepted(Box<TransportRequest>),

    /// The owning client was dropped while an index handle was still in use.
    #[error("Client has been dropped")]
    Disconnected,
}

impl ElasticalError {
    /// Response status, for HTTP errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed response body, when the server answered.
    pub fn body(&self) -> Option<&Payload> {
        match self {
            Self::Http { body, .. } | Self::PartialFailure { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the server reported a missing index, type or document.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Http { body, .. } => body.is_not_found(),
            _ => false,
        }
    }

    /// The captured request, if a request hook intercepted the call.
    pub fn intercepted(&self) -> Option<&TransportRequest> {
        match self {
            Self::Intercepted(request) => Some(request.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ElasticalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_error_display_uses_message() {
        let err = ElasticalError::Http {
            status: StatusCode::NOT_FOUND,
            message: "IndexMissingException[[blog] missing]".to_string(),
            body: Payload::Json(json!({"error": "IndexMissingException[[blog] missing]"})),
        };
        assert_eq!(err.to_string(), "IndexMissingException[[blog] missing]");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_partial_failure_display() {
        let err = ElasticalError::PartialFailure {
            failed: 2,
            reasons: vec!["a".to_string(), "b".to_string()],
            body: Payload::Json(json!({})),
        };
        assert_eq!(err.to_string(), "2 shard(s) failed: a; b");
        assert!(err.body().is_some());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_transport_errors_are_not_missing() {
        let err = ElasticalError::from(TransportError::Connection("refused".to_string()));
        assert!(!err.is_not_found());
        assert!(err.body().is_none());
    }
}
