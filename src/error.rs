//! Error types for the algodesk application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine code used when the server does not supply one.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Normalized error shape reported by the backend (or synthesized for
/// failures that never reached it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub message: String,
    /// HTTP status code. `None` when no response was received.
    pub status: Option<u16>,
    /// Machine-readable code.
    pub code: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(message: impl Into<String>, status: Option<u16>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            code: code.into(),
        }
    }

    /// Create an error carrying the `UNKNOWN_ERROR` code.
    pub fn unknown(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(message, status, UNKNOWN_ERROR_CODE)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}, {})", self.message, status, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

/// The main error type for algodesk.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response from the backend.
    #[error("HTTP error: {0}")]
    Http(ApiError),

    /// No response was received (connection refused, timeout, DNS, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body is not JSON.
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// A `:name` placeholder in a URL template had no substitution.
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(String),

    /// Another call chain is already in flight on this executor.
    #[error("A request is already in flight")]
    Busy,

    /// The call chain was cancelled before it settled.
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new auth error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new invalid format error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(api) => api.status,
            _ => None,
        }
    }

    /// Whether the executor should retry after this failure.
    ///
    /// Only transport failures and server-side (5xx) responses qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http(api) => api.status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Whether the backend rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Structured view of this error, as stored in execution state.
    pub fn api_error(&self) -> ApiError {
        match self {
            Self::Http(api) => api.clone(),
            Self::Network(msg) => ApiError::new(msg.clone(), None, "NETWORK_ERROR"),
            Self::InvalidFormat(msg) => ApiError::new(msg.clone(), None, "INVALID_FORMAT"),
            Self::MissingPathParameter(key) => ApiError::new(
                format!("Missing path parameter: {}", key),
                None,
                "MISSING_PATH_PARAMETER",
            ),
            other => ApiError::unknown(other.to_string(), None),
        }
    }

    /// Message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(api) => api.message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(Error::network("connection refused").is_retryable());
        assert!(Error::Http(ApiError::unknown("boom", Some(503))).is_retryable());
        assert!(Error::Http(ApiError::unknown("boom", Some(500))).is_retryable());
        assert!(!Error::Http(ApiError::unknown("missing", Some(404))).is_retryable());
        assert!(!Error::Http(ApiError::unknown("bad", Some(400))).is_retryable());
        assert!(!Error::invalid_format("text/plain").is_retryable());
        assert!(!Error::Busy.is_retryable());
    }

    #[test]
    fn test_api_error_view() {
        let err = Error::network("timed out");
        let api = err.api_error();
        assert_eq!(api.status, None);
        assert_eq!(api.code, "NETWORK_ERROR");

        let err = Error::Http(ApiError::new("Trade not found", Some(404), "NOT_FOUND"));
        assert_eq!(err.api_error().code, "NOT_FOUND");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Trade not found");
    }

    #[test]
    fn test_unauthorized() {
        let err = Error::Http(ApiError::unknown("Could not validate credentials", Some(401)));
        assert!(err.is_unauthorized());
        assert!(!Error::network("down").is_unauthorized());
    }
}
