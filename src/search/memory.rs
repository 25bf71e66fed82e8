//! In-memory search backend
//!
//! Used for dry runs, where documents are collected and printed instead of
//! written, and as a test double for the pipeline.

use crate::search::{IndexDocument, IndexSchema, SearchClient, SearchError, SearchResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug)]
struct MemoryIndex {
    schema: IndexSchema,
    documents: BTreeMap<String, IndexDocument>,
}

#[derive(Debug, Default)]
struct MemoryState {
    indices: HashMap<String, MemoryIndex>,
    create_calls: usize,
}

/// [`SearchClient`] that keeps indices in process memory
#[derive(Debug, Default)]
pub struct MemorySearchClient {
    state: Mutex<MemoryState>,
}

impl MemorySearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents of an index, ordered by id
    pub fn documents(&self, index: &str) -> Vec<IndexDocument> {
        let state = self.lock();
        state
            .indices
            .get(index)
            .map(|idx| idx.documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// A single document by id
    pub fn document(&self, index: &str, id: &str) -> Option<IndexDocument> {
        let state = self.lock();
        state
            .indices
            .get(index)
            .and_then(|idx| idx.documents.get(id).cloned())
    }

    /// The schema an index was created with
    pub fn schema(&self, index: &str) -> Option<IndexSchema> {
        self.lock().indices.get(index).map(|idx| idx.schema.clone())
    }

    /// Number of times an index was actually created
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn missing_index(index: &str) -> SearchError {
    SearchError::Rejected {
        status: 404,
        body: format!("no such index [{}]", index),
    }
}

#[async_trait]
impl SearchClient for MemorySearchClient {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        Ok(self.lock().indices.contains_key(index))
    }

    async fn create_index(&self, schema: &IndexSchema) -> SearchResult<()> {
        let mut state = self.lock();
        if state.indices.contains_key(&schema.index) {
            return Ok(());
        }

        state.create_calls += 1;
        state.indices.insert(
            schema.index.clone(),
            MemoryIndex {
                schema: schema.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert_document(&self, document: &IndexDocument) -> SearchResult<()> {
        let mut state = self.lock();
        let index = state
            .indices
            .get_mut(&document.index)
            .ok_or_else(|| missing_index(&document.index))?;

        index
            .documents
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn delete_stale(
        &self,
        index: &str,
        manual: &str,
        version: &str,
        uri_prefix: &str,
        keep_ids: &[String],
    ) -> SearchResult<u64> {
        let mut state = self.lock();
        let idx = state
            .indices
            .get_mut(index)
            .ok_or_else(|| missing_index(index))?;

        let keep: HashSet<&str> = keep_ids.iter().map(String::as_str).collect();
        let before = idx.documents.len();
        idx.documents.retain(|id, doc| {
            keep.contains(id.as_str())
                || doc.body.manual != manual
                || doc.body.version != version
                || !doc.body.uri.starts_with(uri_prefix)
        });

        Ok((before - idx.documents.len()) as u64)
    }
}
