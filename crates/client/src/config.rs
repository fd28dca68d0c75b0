//! Configuration for the checks service client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://gerrit-review.googlesource.com";
const DEFAULT_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Where the checks service and the metadata server live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Root URL of the review server hosting the checks plugin.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Metadata endpoint that hands out access tokens.
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Value sent in the `Metadata-Flavor` header.
    #[serde(default = "default_metadata_flavor")]
    pub metadata_flavor: String,

    /// Per-request timeout.
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_url: default_token_url(),
            metadata_flavor: default_metadata_flavor(),
            timeout: default_timeout(),
        }
    }
}

impl ChecksConfig {
    /// Create a config pointing at the given review server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the metadata token URL.
    #[must_use]
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Parsed review server root, always ending in `/` so relative API paths
    /// join underneath it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UrlParse`] if `base_url` is not a valid URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Parsed metadata token URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UrlParse`] if `token_url` is not a valid URL.
    pub fn parsed_token_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.token_url)?)
    }

    /// Set the `Metadata-Flavor` header value.
    #[must_use]
    pub fn metadata_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.metadata_flavor = flavor.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// An unparseable timeout is ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CHECKS_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(url) = std::env::var("CHECKS_TOKEN_URL") {
            config.token_url = url;
        }

        if let Ok(flavor) = std::env::var("CHECKS_METADATA_FLAVOR") {
            config.metadata_flavor = flavor;
        }

        if let Some(secs) = std::env::var("CHECKS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // JSON by extension, TOML otherwise
        if path.extension().is_some_and(|e| e == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config_error(format!("Failed to parse config: {e}")))
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_metadata_flavor() -> String {
    "Google".to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
