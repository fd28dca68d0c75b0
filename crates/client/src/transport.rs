//! Authenticated JSON transport for the checks REST API.
//!
//! Every response body from the review server starts with an anti-XSSI
//! marker that makes it invalid JavaScript. [`decode_prefixed_json`] removes
//! exactly that many bytes and parses the rest.

use std::time::Instant;

use checkers_core::AccessToken;
use reqwest::header::COOKIE;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ChecksConfig;
use crate::error::{Error, Result};

/// Marker prepended to every JSON response by the review server.
pub const MAGIC_PREFIX: &str = ")]}'";

/// Name of the cookie carrying the access token.
const AUTH_COOKIE: &str = "o";

/// Strip [`MAGIC_PREFIX`] from `body` and parse the remainder as JSON.
///
/// The prefix is removed by length. A mismatched marker is logged but not
/// rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] if the body is shorter than the prefix,
/// the prefix ends inside a multi-byte character, or the remainder is not
/// valid JSON.
pub fn decode_prefixed_json(body: &str) -> Result<Value> {
    let prefix_len = MAGIC_PREFIX.len();
    if body.len() < prefix_len {
        return Err(Error::invalid_response(format!(
            "body of {} bytes is shorter than the {prefix_len}-byte response prefix",
            body.len()
        )));
    }

    let payload = body.get(prefix_len..).ok_or_else(|| {
        Error::invalid_response(format!(
            "response prefix ends inside a multi-byte character at byte {prefix_len}"
        ))
    })?;

    if !body.starts_with(MAGIC_PREFIX) {
        debug!(prefix = ?body.get(..prefix_len), "Unexpected response prefix");
    }

    serde_json::from_str(payload)
        .map_err(|e| Error::invalid_response(format!("malformed JSON after prefix: {e}")))
}

/// HTTP transport that attaches the credential cookie to every request.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
}

impl Transport {
    /// Create a transport using the timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ChecksConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http_client })
    }

    /// GET `url` and decode the prefixed JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, non-2xx status, or an
    /// undecodable body.
    pub async fn get(&self, url: &Url, token: &AccessToken) -> Result<Value> {
        let request = self.http_client.get(url.clone());
        self.send(request, url, token).await
    }

    /// POST `body` as JSON to `url` and decode the prefixed JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, non-2xx status, or an
    /// undecodable body.
    pub async fn post<B>(&self, url: &Url, body: &B, token: &AccessToken) -> Result<Value>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request = self.http_client.post(url.clone()).json(body);
        self.send(request, url, token).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
        token: &AccessToken,
    ) -> Result<Value> {
        let start = Instant::now();
        let response = request
            .header(COOKIE, format!("{AUTH_COOKIE}={}", token.secret()))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            url = %url,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Checks API responded"
        );

        if !status.is_success() {
            return Err(Error::bad_status(status.as_u16(), &body));
        }

        decode_prefixed_json(&body)
    }
}
