//! Error taxonomy for checker reconciliation.
//!
//! Every failure is fatal to a run. The three variants tell a caller which
//! stage gave up and carry enough context (the offending spec or endpoint)
//! to diagnose it.

use thiserror::Error;

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Checker reconciliation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A desired checker spec is unusable (missing or empty `uuid`).
    #[error("invalid checker {checker}: {reason}")]
    Validation { checker: String, reason: String },

    /// Credential acquisition failed.
    #[error("failed to acquire credential from {endpoint}: {reason}")]
    Auth { endpoint: String, reason: String },

    /// A request to the checks service failed or returned an undecodable body.
    #[error("request to {endpoint} failed{}: {reason}", status_suffix(.status))]
    Transport {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },
}

impl Error {
    /// Create a validation error naming the offending checker.
    pub fn validation(checker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            checker: checker.into(),
            reason: reason.into(),
        }
    }

    /// Create an auth error.
    pub fn auth(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Auth {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error without an HTTP status.
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a transport error for a non-success HTTP status.
    pub fn transport_status(
        endpoint: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
    ) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: Some(status),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |code| format!(" with status {code}"))
}
