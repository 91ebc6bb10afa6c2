//! Error types shared by transports and the request manager.

use std::time::Duration;
use thiserror::Error;

/// Errors a request can be rejected with.
///
/// Transports produce these; the request manager hands them back to the
/// caller untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request's cancellation token was signalled
    #[error("canceled")]
    Cancelled,

    /// The server responded with a non-2xx status
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Parsed response body (JSON, string, or null)
        data: serde_json::Value,
    },

    /// The request was sent but no response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its time limit
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body could not be read
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, unserializable key, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The client could not be built from its configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cancelled through its token
    Cancelled,
    /// Server answered with an error status
    Response,
    /// Request was made but nothing came back
    NoResponse,
    /// Failed before anything was sent
    Setup,
}

impl ApiError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Status { .. } => ErrorKind::Response,
            Self::Network(_) | Self::Timeout(_) | Self::Decode(_) => ErrorKind::NoResponse,
            Self::InvalidRequest(_) | Self::Config(_) => ErrorKind::Setup,
        }
    }

    /// Check whether this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status of an error response, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_message_matches_transport_convention() {
        assert_eq!(ApiError::Cancelled.to_string(), "canceled");
        assert!(ApiError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_kind_classification() {
        let status = ApiError::Status {
            status: 503,
            data: serde_json::Value::Null,
        };
        assert_eq!(status.kind(), ErrorKind::Response);
        assert_eq!(status.status(), Some(503));
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::NoResponse
        );
        assert_eq!(ApiError::Config("bad".into()).kind(), ErrorKind::Setup);
        assert_eq!(ApiError::Network("reset".into()).status(), None);
    }
}
