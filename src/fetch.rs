//! HTTP access for every component that touches the network.
//!
//! The [`Fetcher`] trait is the single seam between the pipeline and the
//! outside world. [`HttpFetcher`] implements it with `reqwest`; tests swap in
//! an in-memory stub so discovery logic can be exercised without sockets.
//!
//! Every call takes an explicit timeout. A non-success status is reported as
//! [`FetchError::Status`], so callers only see `Ok` for 2xx responses.

use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read body: {0}")]
    Body(String),
}

/// Result of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub content_type: Option<String>,
}

impl Probe {
    pub fn is_xml(&self) -> bool {
        content_type_is_xml(self.content_type.as_deref())
    }
}

/// Result of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// URL after redirects.
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl Page {
    pub fn is_xml(&self) -> bool {
        content_type_is_xml(self.content_type.as_deref())
    }

    /// Body looks like an RSS or Atom document.
    pub fn looks_like_feed(&self) -> bool {
        let lower = self.body.to_ascii_lowercase();
        lower.contains("<rss") || lower.contains("<feed")
    }
}

pub fn content_type_is_xml(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("xml"))
        .unwrap_or(false)
}

/// Network access used by the pipeline.
pub trait Fetcher {
    /// Existence check without downloading the body.
    async fn head(&self, url: &str, timeout: Duration) -> Result<Probe, FetchError>;

    /// Download a document as text.
    async fn get(&self, url: &str, timeout: Duration) -> Result<Page, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    if err.is_builder() {
        return FetchError::InvalidUrl(err.to_string());
    }
    FetchError::Network(err.to_string())
}

fn header_content_type(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn head(&self, url: &str, timeout: Duration) -> Result<Probe, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let resp = self
            .client
            .head(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = resp.status();
        debug!(status = status.as_u16(), "HEAD");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(Probe {
            content_type: header_content_type(&resp),
        })
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str, timeout: Duration) -> Result<Page, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let resp = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = resp.status();
        debug!(status = status.as_u16(), "GET");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let final_url = resp.url().to_string();
        let content_type = header_content_type(&resp);
        let body = resp.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;
        Ok(Page {
            final_url,
            content_type,
            body,
        })
    }
}
