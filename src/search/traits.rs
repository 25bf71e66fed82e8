//! Search client trait and error types
//!
//! This module defines the operations the indexing pipeline needs from a
//! search engine, independent of any concrete backend.

use crate::search::{IndexDocument, IndexSchema};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the search engine
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search engine unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search engine rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid search endpoint: {0}")]
    Endpoint(String),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Trait for search engine backends
///
/// Implementations hold no per-run state; the pipeline may call them from
/// several in-flight link tasks at once.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Checks whether the index exists
    async fn index_exists(&self, index: &str) -> SearchResult<bool>;

    /// Creates the index with the schema's field mapping
    ///
    /// Creating an index that already exists must not fail.
    async fn create_index(&self, schema: &IndexSchema) -> SearchResult<()>;

    /// Creates or overwrites the document with the same id
    async fn upsert_document(&self, document: &IndexDocument) -> SearchResult<()>;

    /// Deletes every document of `manual`/`version` whose `uri` starts with
    /// `uri_prefix` and whose id is not in `keep_ids`
    ///
    /// The prefix confines the sweep to one manual, since locales of the same
    /// manual render the same name and version.
    ///
    /// # Returns
    ///
    /// The number of deleted documents
    async fn delete_stale(
        &self,
        index: &str,
        manual: &str,
        version: &str,
        uri_prefix: &str,
        keep_ids: &[String],
    ) -> SearchResult<u64>;
}
