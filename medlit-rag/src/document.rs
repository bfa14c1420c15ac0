//! Data types for source documents, indexed records, and search hits.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Metadata key holding the document title.
pub const META_TITLE: &str = "title";
/// Metadata key holding the opaque publication year-or-date text.
pub const META_PUBLICATION_DATE: &str = "publication_date";
/// Metadata key holding the journal name.
pub const META_JOURNAL: &str = "journal";
/// Metadata key holding the DOI.
pub const META_DOI: &str = "doi";
/// Metadata key holding the comma-joined keyword list.
pub const META_KEYWORDS: &str = "keywords";

/// A medical literature record as delivered by the source feed.
///
/// Every field is required when deserializing; a record missing any of them
/// is rejected with [`SearchError::InvalidDocument`] by [`parse_documents`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicalDocument {
    /// Paper title.
    pub title: String,
    /// Paper abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Publication year or date, kept as opaque text.
    pub publication_date: String,
    /// Journal the paper appeared in.
    pub journal: String,
    /// Digital Object Identifier, bare or as a URL.
    pub doi: String,
    /// Ordered keyword list.
    pub keywords: Vec<String>,
}

impl MedicalDocument {
    /// The text that gets embedded and stored: title and abstract joined by a
    /// single space, without trimming.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text)
    }

    /// Keywords joined by a bare comma.
    ///
    /// Commas inside a keyword are not escaped, so the join is lossy for such
    /// keywords.
    pub fn joined_keywords(&self) -> String {
        self.keywords.join(",")
    }

    /// Build the metadata map stored alongside the embedding.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (META_TITLE.to_string(), self.title.clone()),
            (META_PUBLICATION_DATE.to_string(), self.publication_date.clone()),
            (META_JOURNAL.to_string(), self.journal.clone()),
            (META_DOI.to_string(), self.doi.clone()),
            (META_KEYWORDS.to_string(), self.joined_keywords()),
        ])
    }
}

/// A document as stored in a [`VectorStore`](crate::VectorStore): id, vector,
/// metadata, and the embedded text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedRecord {
    /// Identifier, unique within a collection.
    pub id: String,
    /// Embedding of [`text`](Self::text).
    pub embedding: Vec<f32>,
    /// Title, publication date, journal, DOI and joined keywords.
    pub metadata: HashMap<String, String>,
    /// Title and abstract joined by a space.
    pub text: String,
}

impl IndexedRecord {
    /// Assemble a record from a source document and its embedding.
    pub fn from_document(
        id: impl Into<String>,
        document: &MedicalDocument,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: document.metadata(),
            text: document.embedding_text(),
        }
    }

    /// Look up a metadata field, returning `""` when absent.
    pub fn field(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// A retrieved [`IndexedRecord`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The retrieved record. Backends may return it without its embedding.
    pub record: IndexedRecord,
    /// The similarity score (higher is more similar).
    pub score: f32,
}

/// Parse a JSON array of [`MedicalDocument`]s.
///
/// # Errors
///
/// Returns [`SearchError::InvalidDocument`] if the JSON is malformed or any
/// record is missing a field. Nothing is returned on partial success.
pub fn parse_documents(json: &str) -> Result<Vec<MedicalDocument>> {
    serde_json::from_str(json).map_err(|e| SearchError::InvalidDocument(e.to_string()))
}

/// Read and parse a JSON file of [`MedicalDocument`]s.
///
/// # Errors
///
/// Returns [`SearchError::InvalidDocument`] if the file cannot be read or
/// parsed.
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<MedicalDocument>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SearchError::InvalidDocument(format!("failed to read '{}': {e}", path.display()))
    })?;
    parse_documents(&raw)
}
