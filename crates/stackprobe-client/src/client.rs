//! HTTP client for the fingerprinting API.

use crate::error::{ClientError, Result};
use crate::fingerprinter::Fingerprinter;
use crate::parser::ResponseParser;
use crate::rate_limit::{FixedDelay, RateLimitPolicy};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use stackprobe_core::config::DEFAULT_ENDPOINT;
use stackprobe_core::{ApiConfig, TechnologyRecord};
use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What came back from a request that reached the server.
enum Reply {
    Body(String),
    Status(StatusCode),
}

/// Client for the fingerprinting API.
///
/// Issues one GET per [`FingerprintClient::fetch`] with the API key and the
/// target URL as query parameters, then applies its [`RateLimitPolicy`]
/// before returning. Requests are never retried.
pub struct FingerprintClient {
    api_key: String,
    endpoint: String,
    session: RwLock<Option<Client>>,
    rate_limit: Arc<dyn RateLimitPolicy>,
}

impl FingerprintClient {
    /// Create a client for the default endpoint with default settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom endpoint and request timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let session = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stackprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            session: RwLock::new(Some(session)),
            rate_limit: Arc::new(FixedDelay::default()),
        })
    }

    /// Create a client from the `[api]` config section.
    ///
    /// # Errors
    /// Returns error if no API key is configured or the HTTP client cannot be created.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Self::with_endpoint(
            config.endpoint.clone(),
            config.api_key()?,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(client.with_rate_limit(Arc::new(FixedDelay::from_secs(
            config.rate_limit_delay_secs,
        ))))
    }

    /// Replace the post-request throttling policy.
    #[must_use]
    pub fn with_rate_limit(mut self, policy: Arc<dyn RateLimitPolicy>) -> Self {
        self.rate_limit = policy;
        self
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether [`FingerprintClient::close`] has been called.
    pub async fn is_closed(&self) -> bool {
        self.session.read().await.is_none()
    }

    /// Fingerprint `url`, producing exactly one record.
    ///
    /// # Errors
    /// Returns [`ClientError::SessionClosed`] if the client was closed.
    pub async fn fetch(&self, url: &str) -> Result<TechnologyRecord> {
        let session = self
            .session
            .read()
            .await
            .clone()
            .ok_or(ClientError::SessionClosed)?;

        let reply = self.request(&session, url).await;

        self.rate_limit.pause().await;

        let record = match reply {
            Ok(Reply::Body(body)) => ResponseParser::parse_str(url, &body),
            Ok(Reply::Status(status)) => {
                tracing::warn!(%url, status = status.as_u16(), "fingerprint API returned an error status");
                TechnologyRecord::failed(url, format!("Error: {}", status.as_u16()))
            }
            Err(e) => {
                let detail = describe_transport_error(e);
                tracing::warn!(%url, error = %detail, "fingerprint request failed");
                TechnologyRecord::failed(url, format!("Error: {detail}"))
            }
        };

        Ok(record)
    }

    /// Drop the HTTP session, releasing pooled connections.
    pub async fn close(&self) {
        if self.session.write().await.take().is_some() {
            tracing::debug!("fingerprint client session closed");
        }
    }

    async fn request(&self, session: &Client, url: &str) -> reqwest::Result<Reply> {
        let response = session
            .get(&self.endpoint)
            .query(&[("key", self.api_key.as_str()), ("url", url)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(Reply::Body(response.text().await?))
        } else {
            Ok(Reply::Status(status))
        }
    }
}

#[async_trait]
impl Fingerprinter for FingerprintClient {
    async fn fetch(&self, url: &str) -> Result<TechnologyRecord> {
        FingerprintClient::fetch(self, url).await
    }

    async fn close(&self) {
        FingerprintClient::close(self).await;
    }
}

/// Render a transport error with its cause chain. The request URL is
/// stripped because it carries the API key.
fn describe_transport_error(error: reqwest::Error) -> String {
    let error = error.without_url();
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}
