//! HTTP fetch gateway
//!
//! Every upstream request goes through [`HttpGateway::get_json`]. Failures are
//! never returned to the caller: they are logged and reported as `None`, so
//! callers only have to decide how to degrade when data is unavailable.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Query parameters whose values never show up in log output
const SECRET_PARAMS: &[&str] = &["apikey", "api_key"];

/// Replacement value for redacted query parameters
const REDACTED: &str = "REDACTED";

/// Errors that can occur while setting up the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildFailed(#[source] reqwest::Error),
}

/// Reasons a single fetch produced no value
///
/// Transport errors are stored without their URL, so the error text never
/// carries API keys into logs.
#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),

    #[error("malformed JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Shared JSON-over-HTTP client used by both provider clients
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
}

impl HttpGateway {
    /// Creates a gateway with the given `User-Agent` and optional request timeout
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClientBuildFailed`] if the TLS backend or the
    /// client configuration cannot be initialized.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(GatewayError::ClientBuildFailed)?;
        Ok(Self { client })
    }

    /// Fetches `url` and decodes the body as JSON
    ///
    /// A single attempt is made. Transport errors, non-success status codes and
    /// malformed bodies are logged together with the (redacted) URL and yield
    /// `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let loggable = redact(&url);
        tracing::debug!(url = %loggable, "API request");

        match self.try_get_json(url).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(url = %loggable, %error, "API fetch failed");
                None
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await.map_err(FetchError::transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl FetchError {
    fn transport(error: reqwest::Error) -> Self {
        Self::Transport(error.without_url())
    }
}

/// Returns a copy of `url` with API key query parameters masked
pub(crate) fn redact(url: &Url) -> Url {
    let mut redacted = url.clone();
    if url.query().is_none() {
        return redacted;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SECRET_PARAMS.contains(&key.as_ref()) {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
