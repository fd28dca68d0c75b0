//! Credential providers.

use async_trait::async_trait;
use checkers_core::{AccessToken, TokenProvider};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::config::ChecksConfig;
use crate::error::{Error, Result};

/// Header the metadata server requires before it will answer.
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Fetches a service-account access token from the instance metadata server.
#[derive(Debug, Clone)]
pub struct MetadataTokenProvider {
    http_client: reqwest::Client,
    token_url: Url,
    metadata_flavor: String,
}

impl MetadataTokenProvider {
    /// Create a provider for the token URL in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ChecksConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            token_url: config.parsed_token_url()?,
            metadata_flavor: config.metadata_flavor.clone(),
        })
    }

    async fn fetch(&self) -> Result<AccessToken> {
        debug!(url = %self.token_url, "Requesting access token");

        let response = self
            .http_client
            .get(self.token_url.clone())
            .header(METADATA_FLAVOR_HEADER, &self.metadata_flavor)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::bad_status(status.as_u16(), &body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        parsed
            .access_token
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| Error::invalid_response("response has no access_token"))
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn acquire(&self) -> checkers_core::Result<AccessToken> {
        let token = self
            .fetch()
            .await
            .map_err(|e| e.into_auth(self.token_url.as_str()))?;
        info!("Acquired access token from metadata server");
        Ok(token)
    }
}

/// Hands out a token supplied up front.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire(&self) -> checkers_core::Result<AccessToken> {
        if self.token.secret().is_empty() {
            return Err(checkers_core::Error::auth("static token", "token is empty"));
        }
        Ok(self.token.clone())
    }
}
