//! Document store trait for storing records and running nearest-neighbor queries.

use async_trait::async_trait;

use crate::document::{IndexedRecord, SearchHit};
use crate::error::Result;

/// A vector database holding [`IndexedRecord`]s in named collections.
///
/// Consistency between a query and a concurrently running batch insert is
/// whatever the backend provides; callers make no assumption beyond
/// "safe to call concurrently".
///
/// # Example
///
/// ```rust,ignore
/// use medlit_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("medical_documents", 384).await?;
/// store.insert_batch("medical_documents", &records).await?;
/// let hits = store.query_nearest("medical_documents", &query_vector, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its records.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert all records in one call.
    ///
    /// Ids, vectors, metadata and texts travel together in each record, so
    /// they are positionally aligned by construction. A failure rejects the
    /// whole call.
    async fn insert_batch(&self, collection: &str, records: &[IndexedRecord]) -> Result<()>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Return up to `limit` records most similar to `vector`.
    ///
    /// Results are ordered by descending score. The order of equally scored
    /// records is stable within a call but otherwise backend-defined.
    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// A short backend name for logs and error messages.
    fn backend(&self) -> &str {
        "store"
    }
}
