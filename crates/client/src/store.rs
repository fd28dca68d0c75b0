//! Checker store backed by the checks plugin REST API.

use async_trait::async_trait;
use checkers_core::{AccessToken, Checker, CheckerSpec, CheckerStore, ExistingChecker};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::ChecksConfig;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Collection endpoint for checkers, relative to the review server root.
pub const CHECKERS_PATH: &str = "a/plugins/checks/checkers/";

/// Client for the checkers collection of one review server.
#[derive(Debug, Clone)]
pub struct ChecksClient {
    transport: Transport,
    collection_url: Url,
}

impl ChecksClient {
    /// Create a client for the review server in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &ChecksConfig) -> Result<Self> {
        let collection_url = config.parsed_base_url()?.join(CHECKERS_PATH)?;
        Ok(Self {
            transport: Transport::new(config)?,
            collection_url,
        })
    }

    /// URL of the checkers collection.
    #[must_use]
    pub const fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// URL of one checker, with `uuid` encoded as a single path segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base URL cannot carry a path.
    pub fn checker_url(&self, uuid: &str) -> Result<Url> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::config_error(format!("{} cannot be a base URL", self.collection_url))
            })?
            .pop_if_empty()
            .push(uuid);
        Ok(url)
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::invalid_response(format!("expected {what}: {e}")))
}

#[async_trait]
impl CheckerStore for ChecksClient {
    async fn list_checkers(
        &self,
        token: &AccessToken,
    ) -> checkers_core::Result<Vec<ExistingChecker>> {
        let endpoint = self.collection_url.as_str();
        let checkers: Vec<Checker> = async {
            let value = self.transport.get(&self.collection_url, token).await?;
            decode(value, "a list of checker objects")
        }
        .await
        .map_err(|e| e.into_transport(endpoint))?;

        info!(count = checkers.len(), "Listed existing checkers");
        Ok(checkers)
    }

    async fn create_checker(
        &self,
        token: &AccessToken,
        spec: &CheckerSpec,
    ) -> checkers_core::Result<ExistingChecker> {
        let endpoint = self.collection_url.as_str();
        debug!(uuid = ?spec.uuid(), "Creating checker");

        async {
            let value = self.transport.post(&self.collection_url, spec, token).await?;
            decode(value, "a checker object")
        }
        .await
        .map_err(|e| e.into_transport(endpoint))
    }

    async fn update_checker(
        &self,
        token: &AccessToken,
        uuid: &str,
        spec: &CheckerSpec,
    ) -> checkers_core::Result<ExistingChecker> {
        let url = self
            .checker_url(uuid)
            .map_err(|e| e.into_transport(self.collection_url.as_str()))?;
        debug!(uuid, "Updating checker");

        async {
            let value = self.transport.post(&url, spec, token).await?;
            decode(value, "a checker object")
        }
        .await
        .map_err(|e| e.into_transport(url.as_str()))
    }
}
