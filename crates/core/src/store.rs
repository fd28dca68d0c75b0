//! Collaborator traits for the reconciler.
//!
//! The credential is passed explicitly on every store call; implementations
//! hold no session of their own.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AccessToken, CheckerSpec, ExistingChecker};

/// Source of the bearer credential used for one run.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch a credential.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Auth`] if the credential cannot be obtained.
    async fn acquire(&self) -> Result<AccessToken>;
}

/// Remote collection of checkers.
#[async_trait]
pub trait CheckerStore: Send + Sync {
    /// Fetch every checker currently defined. Order is not meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] on any request or decode failure.
    async fn list_checkers(&self, token: &AccessToken) -> Result<Vec<ExistingChecker>>;

    /// Create a checker and return the remote's representation of it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] on any request or decode failure.
    async fn create_checker(
        &self,
        token: &AccessToken,
        spec: &CheckerSpec,
    ) -> Result<ExistingChecker>;

    /// Update the checker identified by `uuid` and return its new representation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] on any request or decode failure.
    async fn update_checker(
        &self,
        token: &AccessToken,
        uuid: &str,
        spec: &CheckerSpec,
    ) -> Result<ExistingChecker>;
}
