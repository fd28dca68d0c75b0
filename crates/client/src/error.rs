//! Error types for the checks service client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the checks service or the
/// metadata server.
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The response could not be turned into the expected value.
    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Configuration error.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a bad status error, keeping at most the first 200 characters
    /// of the body.
    pub fn bad_status(status: u16, body: &str) -> Self {
        Self::BadStatus {
            status,
            body: body.chars().take(200).collect(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Map into the reconciler's transport error for `endpoint`.
    #[must_use]
    pub fn into_transport(self, endpoint: &str) -> checkers_core::Error {
        match self {
            Self::BadStatus { status, body } => {
                checkers_core::Error::transport_status(endpoint, status, body)
            }
            other => checkers_core::Error::transport(endpoint, other.to_string()),
        }
    }

    /// Map into the reconciler's auth error for `endpoint`.
    #[must_use]
    pub fn into_auth(self, endpoint: &str) -> checkers_core::Error {
        checkers_core::Error::auth(endpoint, self.to_string())
    }
}
