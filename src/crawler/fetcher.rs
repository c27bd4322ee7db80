//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline:
//! - Building HTTP clients with a proper user agent string
//! - GET requests for index pages, detail pages and image bytes
//! - Error classification (status, timeout, transport)
//!
//! Fetches are never retried here. A failed fetch is returned to the caller,
//! which decides whether it is fatal for a page or for a single puzzle.

use crate::config::{HttpConfig, UserAgentConfig};
use crate::url::index_page_url;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// Source of raw page content and bytes
///
/// The crawler and the enrichment worker only talk to the network through
/// this trait, so tests can substitute canned pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs a URL and returns its body as text
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// GETs a URL and returns its body as raw bytes
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// GETs a 1-based page of the index
    async fn fetch_page(&self, base_url: &str, page: u32) -> Result<String, FetchError> {
        self.fetch_text(&index_page_url(base_url, page)).await
    }
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `http` - Timeouts for each request
///
/// # Example
///
/// ```no_run
/// use kakurizer::config::{HttpConfig, UserAgentConfig};
/// use kakurizer::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "Kakurizer".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(http.request_timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from configuration
    pub fn new(user_agent: &UserAgentConfig, http: &HttpConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client(user_agent, http)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| classify_error(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| classify_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
