//! Error types shared by the storekit clients

use std::fmt;
use thiserror::Error;

/// Normalized error reported by a remote service.
///
/// Both backends map their error bodies onto this shape: the storage
/// service returns plain text, the repository service returns JSON with an
/// optional traceback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code of the response
    pub status: u16,
    /// Message extracted from the body, or the status reason phrase
    pub message: String,
    /// Server-side traceback lines, when the service sends them
    pub traceback: Vec<String>,
}

impl ServiceError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            traceback: Vec::new(),
        }
    }

    pub fn with_traceback(mut self, traceback: Vec<String>) -> Self {
        self.traceback = traceback;
        self
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Client operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    // ============ Transport Errors ============
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request timed out")]
    Timeout,

    // ============ Service Errors ============
    #[error("Authentication failed ({0})")]
    AuthFailed(ServiceError),

    #[error("Service returned an error ({0})")]
    Service(ServiceError),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    // ============ Decode Errors ============
    #[error("Failed to decode response body: {message}")]
    Decode { message: String },

    // ============ Client-side Errors ============
    #[error("Invalid request: {message}")]
    Validation { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid client certificate: {message}")]
    InvalidCertificate { message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode {
            message: message.into(),
        }
    }

    /// HTTP status attached to this error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::AuthFailed(e) | StoreError::Service(e) => Some(e.status),
            StoreError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The normalized service error, for auth and service failures
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            StoreError::AuthFailed(e) | StoreError::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a caller-driven retry could plausibly succeed.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { .. } | StoreError::Timeout => true,
            StoreError::Service(e) => e.status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else if e.is_decode() {
            StoreError::Decode {
                message: e.to_string(),
            }
        } else if e.is_connect() {
            StoreError::Transport {
                message: format!("Connection failed: {}", e),
            }
        } else {
            StoreError::Transport {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode {
            message: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(e: serde_yaml::Error) -> Self {
        StoreError::InvalidConfig {
            message: e.to_string(),
        }
    }
}

impl From<url::ParseError> for StoreError {
    fn from(e: url::ParseError) -> Self {
        StoreError::InvalidUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_retryable() {
        let err = StoreError::Service(ServiceError::new(503, "busy"));
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());

        let err = StoreError::Service(ServiceError::new(404, "missing"));
        assert!(!err.is_retryable());

        let err = StoreError::AuthFailed(ServiceError::new(403, "denied"));
        assert_eq!(err.service_error().map(|e| e.message.as_str()), Some("denied"));
        assert!(!err.is_retryable());

        assert!(StoreError::Timeout.is_retryable());
        assert_eq!(StoreError::Timeout.status(), None);
    }

    #[test]
    fn test_display() {
        let err = StoreError::Service(ServiceError::new(404, "not found"));
        assert_eq!(
            err.to_string(),
            "Service returned an error (status 404: not found)"
        );
    }
}
