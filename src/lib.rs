//! Manual Indexer: section-level search indexing for rendered documentation manuals
//!
//! This crate crawls a published manual through its sitemap page, extracts one
//! record per heading-level section, and upserts those records into an
//! Elasticsearch-compatible index.

pub mod config;
pub mod crawler;
pub mod output;
pub mod search;
pub mod url;

use std::time::Duration;
use thiserror::Error;

pub use crawler::FetchError;
pub use search::SearchError;

/// Main error type for indexing operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Sitemap discovery failed for {url}: {message}")]
    Discovery { url: String, message: String },

    #[error("Fragment #{fragment} not found on {url}")]
    FragmentNotFound { url: String, fragment: String },

    #[error("Failed to provision index {index}: {source}")]
    IndexProvisioning { index: String, source: SearchError },

    #[error("Failed to write document {id} for {uri}: {source}")]
    Write {
        id: String,
        uri: String,
        source: SearchError,
    },

    #[error("Failed to retract stale documents of {manual} ({version}): {source}")]
    Retraction {
        manual: String,
        version: String,
        source: SearchError,
    },

    #[error("Indexing run exceeded its deadline of {0:?}")]
    Timeout(Duration),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl IndexerError {
    /// Create a sitemap discovery error.
    pub fn discovery(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Discovery {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl std::fmt::Debug) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: format!("{:?}", message),
        }
    }

    /// Returns true if this error aborts a whole run rather than a single link
    pub fn is_run_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Fetch(_) | Self::FragmentNotFound { .. } | Self::Write { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for indexing operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{IndexRunResult, LinkFailure, ManualIndexer};
pub use search::{ElasticsearchClient, IndexDocument, IndexSchema, MemorySearchClient, SearchClient};
pub use crate::url::{normalize_section_url, resolve_sitemap_url};
