//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Classifying failures into retryable and terminal kinds
//! - Retrying transient failures with bounded exponential backoff

use crate::config::{HttpConfig, RetryConfig};
use crate::state::InaccessibleReason;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A successfully fetched HTML document
#[derive(Debug, Clone)]
pub struct RawContent {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body
    pub body: String,
}

impl RawContent {
    /// Wraps an HTML body fetched from `url` with status 200
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: url.into(),
            status_code: StatusCode::OK.as_u16(),
            body: body.into(),
        }
    }
}

/// Classified failure of a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection failure or timeout
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Response was not a usable HTML document
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Kind | Retry |
    /// |------|-------|
    /// | Network | yes |
    /// | HTTP 5xx, 429 | yes |
    /// | Other HTTP status | no |
    /// | Malformed | no |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus(code) => {
                *code >= 500 || *code == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            Self::Malformed(_) => false,
        }
    }

    /// How a terminal failure is reported in the inaccessible partition
    pub fn inaccessible_reason(&self) -> InaccessibleReason {
        match self {
            Self::Malformed(_) => InaccessibleReason::ParseError,
            Self::Network(_) => InaccessibleReason::Unreachable,
            Self::HttpStatus(_) if self.is_retryable() => InaccessibleReason::Unreachable,
            Self::HttpStatus(_) => InaccessibleReason::NotFound,
        }
    }
}

/// Source of raw page content
///
/// The crawler only talks to the network through this trait, so tests can
/// substitute an in-memory catalog.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Performs a single fetch attempt
    async fn fetch(&self, uri: &str) -> Result<RawContent, FetchError>;
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<RawContent, FetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // A missing Content-Type is tolerated; a non-HTML one is not
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.contains("text/html") {
                return Err(FetchError::Malformed(format!(
                    "expected HTML, got {}",
                    content_type
                )));
            }
        }

        let body = response.text().await.map_err(|e| body_error(&e))?;

        if body.trim().is_empty() {
            return Err(FetchError::Malformed("empty body".to_string()));
        }

        Ok(RawContent {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Classifies a failure to send a request or receive its headers
fn transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request timeout".to_string())
    } else if e.is_connect() {
        FetchError::Network(format!("connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Classifies a failure while reading the response body
///
/// Timeouts and dropped connections are transport failures; anything else
/// (undecodable content) means the document itself is unusable.
fn body_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() || e.is_body() {
        transport_error(e)
    } else {
        FetchError::Malformed(format!("unreadable body: {}", e))
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            factor: config.factor.max(1),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1 for the first retry)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = self.factor.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }
}

/// Fetches `uri`, retrying transient failures according to `policy`
///
/// Backoff waits end early when `cancel` fires; the failure that caused the
/// wait is then returned as final. A request already in flight is never
/// interrupted; it completes or hits the client timeout.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    uri: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<RawContent, FetchError> {
    let mut attempt = 1;

    loop {
        match fetcher.fetch(uri).await {
            Ok(content) => return Ok(content),
            Err(error) if error.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    uri,
                    error,
                    delay
                );

                tokio::select! {
                    _ = cancel.cancelled() => return Err(error),
                    _ = tokio::time::sleep(delay) => {}
                }

                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
