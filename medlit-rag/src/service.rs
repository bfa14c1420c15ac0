//! Medical literature search facade.
//!
//! [`MedicalSearch`] wires one [`EmbeddingProvider`] and one [`VectorStore`]
//! into an [`IngestionPipeline`] and a [`QueryPlanner`]. Both share the same
//! provider handle, so documents and queries are always embedded by the same
//! model.
//!
//! # Example
//!
//! ```rust,ignore
//! use medlit_rag::{HashingEmbeddingProvider, InMemoryVectorStore, MedicalSearch, SearchConfig};
//!
//! let search = MedicalSearch::builder()
//!     .config(SearchConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! search.ensure_collection().await?;
//! search.ingest(&medlit_rag::sample_documents()).await?;
//! let (report, stats) = search.search_form("diabetes treatment", "", "", "", Some(2)).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::config::SearchConfig;
use crate::document::MedicalDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SearchError};
use crate::hashing::HashingEmbeddingProvider;
use crate::ingest::{IngestReport, IngestionPipeline};
use crate::planner::{QueryPlanner, SearchOutcome, SearchRequest};
use crate::vectorstore::VectorStore;

/// Ingestion and search over one collection.
///
/// Construct one via [`MedicalSearch::builder()`].
pub struct MedicalSearch {
    config: SearchConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    ingestion: IngestionPipeline,
    planner: QueryPlanner,
}

impl MedicalSearch {
    /// Create a new [`MedicalSearchBuilder`].
    pub fn builder() -> MedicalSearchBuilder {
        MedicalSearchBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Return the query planner.
    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// Create the configured collection if it does not exist, sized to the
    /// provider's dimensionality.
    ///
    /// # Errors
    ///
    /// Returns the store's error if creation fails.
    pub async fn ensure_collection(&self) -> Result<()> {
        let name = self.config.collection_name.as_str();
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(name, dimensions).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
            e
        })
    }

    /// Number of records stored in the configured collection.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the count fails.
    pub async fn record_count(&self) -> Result<usize> {
        self.vector_store.count(&self.config.collection_name).await
    }

    /// Embed and store documents. See [`IngestionPipeline::ingest`].
    ///
    /// # Errors
    ///
    /// Propagates embedding and store failures unchanged.
    pub async fn ingest(&self, documents: &[MedicalDocument]) -> Result<IngestReport> {
        self.ingestion.ingest(documents).await
    }

    /// Run a structured search. See [`QueryPlanner::search`].
    ///
    /// # Errors
    ///
    /// Propagates embedding and store failures unchanged.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        self.planner.search(request).await
    }

    /// Run a form-style search. See [`QueryPlanner::search_form`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilterInput`] for a bad limit and
    /// propagates embedding and store failures unchanged.
    pub async fn search_form(
        &self,
        query: &str,
        publication_year: &str,
        journal: &str,
        keywords: &str,
        limit: Option<usize>,
    ) -> Result<(String, String)> {
        self.planner.search_form(query, publication_year, journal, keywords, limit).await
    }
}

/// Builder for constructing a [`MedicalSearch`].
///
/// The vector store is required. The configuration defaults to
/// [`SearchConfig::default()`]. Without an explicit embedding provider, one
/// is chosen from [`SearchConfig::embedding_endpoint`]: an
/// OpenAI-compatible client when it is set (feature `openai`), otherwise the
/// offline [`HashingEmbeddingProvider`].
#[derive(Default)]
pub struct MedicalSearchBuilder {
    config: Option<SearchConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    embedding_api_key: Option<String>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl MedicalSearchBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for both documents and queries.
    ///
    /// Overrides the endpoint settings in the configuration.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Bearer key for the configured embeddings endpoint.
    pub fn embedding_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.embedding_api_key = Some(api_key.into());
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`MedicalSearch`], validating the configuration and that all
    /// required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] if the store is missing, the
    /// configuration is invalid, or an endpoint is configured in a build
    /// without the `openai` feature.
    pub fn build(self) -> Result<MedicalSearch> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| SearchError::ConfigError("vector_store is required".to_string()))?;
        let embedding_provider = match self.embedding_provider {
            Some(provider) => provider,
            None => configured_provider(&config, self.embedding_api_key)?,
        };

        let ingestion = IngestionPipeline::new(
            config.clone(),
            Arc::clone(&embedding_provider),
            Arc::clone(&vector_store),
        )?;
        let planner = QueryPlanner::new(
            config.clone(),
            Arc::clone(&embedding_provider),
            Arc::clone(&vector_store),
        )?;

        Ok(MedicalSearch { config, embedding_provider, vector_store, ingestion, planner })
    }
}

fn configured_provider(
    config: &SearchConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let Some(endpoint) = &config.embedding_endpoint else {
        info!("no embedding endpoint configured, using the offline hashing provider");
        return Ok(Arc::new(HashingEmbeddingProvider::default()));
    };
    endpoint_provider(endpoint, config, api_key)
}

#[cfg(feature = "openai")]
fn endpoint_provider(
    endpoint: &str,
    config: &SearchConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let mut provider = crate::openai::OpenAIEmbeddingProvider::new(endpoint)?;
    if let Some(model) = &config.embedding_model {
        provider = provider.with_model(model.clone());
    }
    if let Some(dims) = config.embedding_dimensions {
        provider = provider.with_native_dimensions(dims);
    }
    if let Some(key) = api_key {
        provider = provider.with_api_key(key);
    }
    info!(endpoint, "using remote embedding provider");
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "openai"))]
fn endpoint_provider(
    endpoint: &str,
    _config: &SearchConfig,
    _api_key: Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    Err(SearchError::ConfigError(format!(
        "embedding_endpoint {endpoint} needs the `openai` feature"
    )))
}
