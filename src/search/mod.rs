//! Search module for writing manual sections to the index
//!
//! This module handles everything on the search engine side:
//! - Index schema and document shapes
//! - Index provisioning with create-if-absent semantics
//! - Upserting section documents
//! - Elasticsearch REST client and an in-memory client for dry runs

mod elasticsearch;
mod memory;
mod schema;
mod traits;

pub use elasticsearch::ElasticsearchClient;
pub use memory::MemorySearchClient;
pub use schema::{
    document_id, DocumentBody, IndexDocument, IndexSchema, DEFAULT_DOCUMENT_TYPE, DEFAULT_INDEX,
    KEYWORD_FIELDS,
};
pub use traits::{SearchClient, SearchError, SearchResult};

use crate::IndexerError;

/// Ensures the index exists with the expected mapping
///
/// Creates the index when it is absent. An existing index is left untouched;
/// its mapping is neither verified nor migrated.
///
/// # Returns
///
/// * `Ok(true)` - The index was created
/// * `Ok(false)` - The index already existed
/// * `Err(IndexerError::IndexProvisioning)` - The engine rejected the check or creation
pub async fn ensure_index(
    client: &dyn SearchClient,
    schema: &IndexSchema,
) -> Result<bool, IndexerError> {
    let provisioning_error = |source| IndexerError::IndexProvisioning {
        index: schema.index.clone(),
        source,
    };

    if client
        .index_exists(&schema.index)
        .await
        .map_err(provisioning_error)?
    {
        tracing::debug!("Index {} already exists", schema.index);
        return Ok(false);
    }

    client
        .create_index(schema)
        .await
        .map_err(provisioning_error)?;

    tracing::info!("Created index {} with keyword mapping", schema.index);
    Ok(true)
}

/// Upserts one section document
pub async fn write_document(
    client: &dyn SearchClient,
    document: &IndexDocument,
) -> Result<(), IndexerError> {
    client
        .upsert_document(document)
        .await
        .map_err(|source| IndexerError::Write {
            id: document.id.clone(),
            uri: document.body.uri.clone(),
            source,
        })
}
