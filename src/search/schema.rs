//! Index schema and document shapes
//!
//! The document body is a wire contract shared with every consumer of the
//! index; field names must not change.

use crate::crawler::SectionContent;
use crate::url::normalize_section_url;
use crate::UrlResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Index every manual section is written to
pub const DEFAULT_INDEX: &str = "typo3documentation";

/// Mapping type of manual section documents
pub const DEFAULT_DOCUMENT_TYPE: &str = "manualentry";

/// Fields indexed for exact matching (faceting by manual and version)
pub const KEYWORD_FIELDS: [&str; 2] = ["manual", "version"];

/// Target index and the mapping it must carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub index: String,
    pub document_type: String,
}

impl IndexSchema {
    pub fn new(index: impl Into<String>, document_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            document_type: document_type.into(),
        }
    }

    /// Field mapping declaring the keyword fields
    pub fn properties(&self) -> Value {
        let properties: serde_json::Map<String, Value> = KEYWORD_FIELDS
            .iter()
            .map(|field| (field.to_string(), json!({ "type": "keyword" })))
            .collect();
        Value::Object(properties)
    }

    /// The `mappings` object for index creation
    ///
    /// Typed mappings nest the properties under the document type, as
    /// Elasticsearch releases before 7 expect.
    pub fn mappings(&self, typed: bool) -> Value {
        if typed {
            let mut mappings = serde_json::Map::new();
            mappings.insert(
                self.document_type.clone(),
                json!({ "properties": self.properties() }),
            );
            Value::Object(mappings)
        } else {
            json!({ "properties": self.properties() })
        }
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX, DEFAULT_DOCUMENT_TYPE)
    }
}

/// Searchable body of one manual section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    pub manual: String,
    pub version: String,
    pub uri: String,
    pub title: String,
    pub content: String,
}

/// One search record per manual section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    pub index: String,
    pub document_type: String,
    pub id: String,
    pub body: DocumentBody,
}

impl IndexDocument {
    /// Builds the document for an extracted section
    pub fn from_section(schema: &IndexSchema, section: SectionContent) -> UrlResult<Self> {
        let id = document_id(&section.source_uri)?;

        Ok(Self {
            index: schema.index.clone(),
            document_type: schema.document_type.clone(),
            id,
            body: DocumentBody {
                manual: section.manual,
                version: section.version,
                uri: section.source_uri,
                title: section.title,
                content: section.body_text,
            },
        })
    }
}

/// Derives the document id of a section from its URL
///
/// The id is the lowercase hex SHA-256 of the normalized section URL
/// (fragment included), so equivalent spellings of one section URL share an
/// id and re-indexing overwrites instead of duplicating.
///
/// # Examples
///
/// ```
/// use manual_indexer::search::document_id;
///
/// let a = document_id("https://DOCS.example.org/m/./Index.html#intro").unwrap();
/// let b = document_id("https://docs.example.org/m/Index.html#intro").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn document_id(source_uri: &str) -> UrlResult<String> {
    let normalized = normalize_section_url(source_uri)?;
    Ok(hex::encode(Sha256::digest(normalized.as_str().as_bytes())))
}
