//! HTTP page fetcher
//!
//! This module handles all requests against the documentation site:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for sitemap and content pages
//! - Classifying transport failures, timeouts and non-success statuses

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::Html;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single page
const MAX_REDIRECTS: usize = 10;

/// Errors raised while fetching a page from the documentation site
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }

    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// A successfully fetched HTML page
///
/// The body is kept as text and parsed on demand, so a page can cross await
/// points while the parsed tree stays local to synchronous extraction code.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested (never carries a fragment)
    pub url: Url,

    /// URL after following redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Raw HTML body
    pub body: String,
}

impl FetchedPage {
    /// Parses the body into an HTML document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Capability to retrieve one page of the documentation site
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` (its fragment is ignored) and returns the page on a 2xx response
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use manual_indexer::config::{CrawlerConfig, UserAgentConfig};
/// use manual_indexer::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.user_agent_string())
        .timeout(crawler.fetch_timeout())
        .connect_timeout(Duration::from_secs(10).min(crawler.fetch_timeout()))
        .redirect(Policy::limited(MAX_REDIRECTS))
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
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the fetcher and its client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut request_url = url.clone();
        request_url.set_fragment(None);

        tracing::debug!("Fetching {}", request_url);

        let response = self
            .client
            .get(request_url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&request_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request_url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&request_url, e))?;

        Ok(FetchedPage {
            url: request_url,
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}
