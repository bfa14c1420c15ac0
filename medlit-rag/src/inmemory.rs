//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and corpora that fit comfortably in memory.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{IndexedRecord, SearchHit};
use crate::error::{Result, SearchError};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

#[derive(Debug)]
struct Collection {
    dimensions: usize,
    /// Insertion order; equal scores keep this order in query results.
    records: Vec<IndexedRecord>,
    ids: HashSet<String>,
}

/// An in-memory vector store using brute-force cosine similarity.
///
/// Collections are stored as name → records in insertion order. Batch
/// inserts are all-or-nothing: a duplicate id or a wrong-sized vector
/// anywhere in the batch rejects the batch before anything is written.
///
/// # Example
///
/// ```rust,ignore
/// use medlit_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("medical_documents", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> String {
        format!("collection '{collection}' does not exist")
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_insert_with(|| Collection {
            dimensions,
            records: Vec::new(),
            ids: HashSet::new(),
        });
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn insert_batch(&self, collection: &str, records: &[IndexedRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| SearchError::StoreWriteFailure {
            backend: BACKEND.to_string(),
            message: Self::missing(collection),
        })?;

        let mut batch_ids = HashSet::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != store.dimensions {
                return Err(SearchError::StoreWriteFailure {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "record '{}' has {} dimensions, collection '{collection}' expects {}",
                        record.id,
                        record.embedding.len(),
                        store.dimensions
                    ),
                });
            }
            if store.ids.contains(&record.id) || !batch_ids.insert(record.id.as_str()) {
                return Err(SearchError::StoreWriteFailure {
                    backend: BACKEND.to_string(),
                    message: format!("duplicate id '{}' in collection '{collection}'", record.id),
                });
            }
        }

        for record in records {
            store.ids.insert(record.id.clone());
            store.records.push(record.clone());
        }
        debug!(collection, count = records.len(), "inserted records");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections.get(collection).map(|c| c.records.len()).ok_or_else(|| {
            SearchError::StoreQueryFailure {
                backend: BACKEND.to_string(),
                message: Self::missing(collection),
            }
        })
    }

    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| SearchError::StoreQueryFailure {
            backend: BACKEND.to_string(),
            message: Self::missing(collection),
        })?;

        if vector.len() != store.dimensions {
            return Err(SearchError::DimensionMismatch {
                expected: store.dimensions,
                actual: vector.len(),
            });
        }

        let mut scored: Vec<SearchHit> = store
            .records
            .iter()
            .map(|record| SearchHit {
                score: cosine_similarity(&record.embedding, vector),
                record: record.clone(),
            })
            .collect();

        // `sort_by` is stable, so ties stay in insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    fn backend(&self) -> &str {
        BACKEND
    }
}
