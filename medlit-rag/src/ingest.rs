//! Ingestion pipeline: documents → embeddings → one batch insert.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{error, info};

use crate::config::{IdScheme, SearchConfig};
use crate::document::{IndexedRecord, MedicalDocument};
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::vectorstore::VectorStore;

/// Outcome of one ingestion call, for observability only.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Number of documents written.
    pub documents_processed: usize,
    /// Ids assigned, in input order.
    pub ids: Vec<String>,
    /// Wall-clock time of the whole call.
    pub elapsed: Duration,
}

/// Turns [`MedicalDocument`]s into [`IndexedRecord`]s and writes them to a
/// [`VectorStore`] in a single batch.
pub struct IngestionPipeline {
    config: SearchConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl IngestionPipeline {
    /// Create a pipeline over explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`](crate::SearchError::ConfigError)
    /// if the configuration is invalid.
    pub fn new(
        config: SearchConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, embedding_provider, vector_store })
    }

    fn assign_id(&self, index: usize) -> String {
        match self.config.id_scheme {
            IdScheme::Sequential => format!("doc_{index}"),
            IdScheme::Uuid => uuid::Uuid::new_v4().to_string(),
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let expected = self.embedding_provider.dimensions();
        let vector = self.embedding_provider.embed(text).await?;
        if vector.len() != expected {
            return Err(SearchError::DimensionMismatch { expected, actual: vector.len() });
        }
        Ok(vector)
    }

    /// Embed and store all documents.
    ///
    /// Embedding runs with at most `ingest_concurrency` calls in flight and
    /// results are kept in input order. The store sees exactly one
    /// `insert_batch` call, or none for empty input.
    ///
    /// # Errors
    ///
    /// Any embedding failure or wrong-sized vector aborts the call before the
    /// store is touched. A store rejection is returned as-is; nothing is
    /// retried or rolled back here.
    pub async fn ingest(&self, documents: &[MedicalDocument]) -> Result<IngestReport> {
        let started = Instant::now();
        let collection = self.config.collection_name.as_str();

        if documents.is_empty() {
            info!(collection, document_count = 0, "ingested documents (empty)");
            return Ok(IngestReport {
                documents_processed: 0,
                ids: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        let texts: Vec<String> = documents.iter().map(MedicalDocument::embedding_text).collect();
        let embeddings: Vec<Vec<f32>> = stream::iter(texts.iter())
            .map(|text| self.embed_one(text))
            .buffered(self.config.ingest_concurrency)
            .try_collect()
            .await
            .map_err(|e| {
                error!(
                    collection,
                    provider = self.embedding_provider.name(),
                    error = %e,
                    "embedding failed during ingestion"
                );
                e
            })?;

        let records: Vec<IndexedRecord> = documents
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (document, embedding))| {
                IndexedRecord::from_document(self.assign_id(index), document, embedding)
            })
            .collect();

        self.vector_store.insert_batch(collection, &records).await.map_err(|e| {
            error!(
                collection,
                backend = self.vector_store.backend(),
                error = %e,
                "batch insert failed"
            );
            e
        })?;

        let elapsed = started.elapsed();
        info!(
            collection,
            document_count = records.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "ingested documents"
        );

        Ok(IngestReport {
            documents_processed: records.len(),
            ids: records.into_iter().map(|r| r.id).collect(),
            elapsed,
        })
    }
}
