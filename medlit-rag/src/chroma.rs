//! Chroma vector store backend.
//!
//! Provides [`ChromaVectorStore`] which implements [`VectorStore`] against
//! the Chroma HTTP API (v1) using `reqwest`. This module is only available
//! when the `chroma` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use medlit_rag::chroma::ChromaVectorStore;
//!
//! let store = ChromaVectorStore::new("http://localhost:8000")?;
//! store.create_collection("medical_documents", 768).await?;
//! store.insert_batch("medical_documents", &records).await?;
//! let hits = store.query_nearest("medical_documents", &query_vector, 5).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{IndexedRecord, SearchHit};
use crate::error::{Result, SearchError};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "chroma";

/// The default Chroma server URL.
pub const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";

/// A [`VectorStore`] backed by a [Chroma](https://www.trychroma.com/) server.
///
/// Collections are created with cosine space, so scores are reported as
/// `1 - distance`. Collection name → id lookups are cached.
pub struct ChromaVectorStore {
    client: reqwest::Client,
    base_url: String,
    collection_ids: RwLock<HashMap<String, String>>,
}

impl ChromaVectorStore {
    /// Create a store talking to the Chroma server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SearchError::ConfigError("chroma url must not be empty".to_string()));
        }
        Ok(Self { client: reqwest::Client::new(), base_url, collection_ids: RwLock::default() })
    }

    /// Create a store using [`DEFAULT_CHROMA_URL`].
    pub fn default_url() -> Result<Self> {
        Self::new(DEFAULT_CHROMA_URL)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        to_error: fn(String) -> SearchError,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| to_error(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(to_error(format!("server returned {status}: {body}")));
        }
        response.json().await.map_err(|e| to_error(format!("failed to parse response: {e}")))
    }

    async fn collection_id(
        &self,
        name: &str,
        to_error: fn(String) -> SearchError,
    ) -> Result<String> {
        if let Some(id) = self.collection_ids.read().await.get(name) {
            return Ok(id.clone());
        }
        let collection: CollectionInfo =
            Self::send(self.client.get(self.url(&format!("collections/{name}"))), to_error).await?;
        self.collection_ids.write().await.insert(name.to_string(), collection.id.clone());
        Ok(collection.id)
    }
}

fn write_failure(message: String) -> SearchError {
    SearchError::StoreWriteFailure { backend: BACKEND.to_string(), message }
}

fn query_failure(message: String) -> SearchError {
    SearchError::StoreQueryFailure { backend: BACKEND.to_string(), message }
}

// ── Chroma API request/response types ──────────────────────────────

#[derive(Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    metadatas: Vec<&'a HashMap<String, String>>,
    documents: Vec<&'a str>,
}

impl<'a> AddRequest<'a> {
    fn from_records(records: &'a [IndexedRecord]) -> Self {
        Self {
            ids: records.iter().map(|r| r.id.as_str()).collect(),
            embeddings: records.iter().map(|r| r.embedding.as_slice()).collect(),
            metadatas: records.iter().map(|r| &r.metadata).collect(),
            documents: records.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

/// Query response; each field holds one inner list per query embedding.
#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<HashMap<String, Value>>>>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
}

fn metadata_to_strings(metadata: HashMap<String, Value>) -> HashMap<String, String> {
    metadata
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, v)
        })
        .collect()
}

/// Flatten the first (only) query's columns into hits.
fn into_hits(response: QueryResponse) -> Vec<SearchHit> {
    let ids = response.ids.into_iter().next().unwrap_or_default();
    let mut distances =
        response.distances.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();
    let mut metadatas =
        response.metadatas.and_then(|m| m.into_iter().next()).unwrap_or_default().into_iter();
    let mut documents =
        response.documents.and_then(|d| d.into_iter().next()).unwrap_or_default().into_iter();

    ids.into_iter()
        .map(|id| {
            let distance = distances.next().flatten().unwrap_or(1.0);
            let metadata = metadatas.next().flatten().map(metadata_to_strings).unwrap_or_default();
            let text = documents.next().flatten().unwrap_or_default();
            SearchHit {
                record: IndexedRecord { id, embedding: Vec::new(), metadata, text },
                score: 1.0 - distance,
            }
        })
        .collect()
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let body = json!({
            "name": name,
            "metadata": {"hnsw:space": "cosine"},
            "get_or_create": true,
        });
        let collection: CollectionInfo =
            Self::send(self.client.post(self.url("collections")).json(&body), write_failure).await?;
        self.collection_ids.write().await.insert(name.to_string(), collection.id);
        debug!(collection = name, dimensions, "ensured chroma collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("collections/{name}")))
            .send()
            .await
            .map_err(|e| write_failure(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(write_failure(format!("server returned {status}")));
        }
        self.collection_ids.write().await.remove(name);
        debug!(collection = name, "deleted chroma collection");
        Ok(())
    }

    async fn insert_batch(&self, collection: &str, records: &[IndexedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let id = self.collection_id(collection, write_failure).await?;
        let body = AddRequest::from_records(records);
        let _: Value = Self::send(
            self.client.post(self.url(&format!("collections/{id}/add"))).json(&body),
            write_failure,
        )
        .await?;
        debug!(collection, count = records.len(), "added records to chroma");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let id = self.collection_id(collection, query_failure).await?;
        let request = self.client.get(self.url(&format!("collections/{id}/count")));
        Self::send(request, query_failure).await
    }

    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let id = self.collection_id(collection, query_failure).await?;
        let body = QueryRequest {
            query_embeddings: [vector],
            n_results: limit,
            include: ["metadatas", "documents", "distances"],
        };
        let response: QueryResponse = Self::send(
            self.client.post(self.url(&format!("collections/{id}/query"))).json(&body),
            query_failure,
        )
        .await?;
        Ok(into_hits(response))
    }

    fn backend(&self) -> &str {
        BACKEND
    }
}
