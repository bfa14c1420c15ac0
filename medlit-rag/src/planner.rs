//! Query planner: free text plus filters → one nearest-neighbor query → report.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::document::SearchHit;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::filter::{FilterMode, FilterSpec};
use crate::report::{SearchReport, SearchStats};
use crate::vectorstore::VectorStore;

/// A free-text query with its structured filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Text to embed and search for.
    pub query: String,
    /// Optional constraints and the result bound.
    pub filters: FilterSpec,
}

impl SearchRequest {
    /// Create a request.
    pub fn new(query: impl Into<String>, filters: FilterSpec) -> Self {
        Self { query: query.into(), filters }
    }
}

/// The formatted result of a search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Ranked result blocks.
    pub report: SearchReport,
    /// Timing line.
    pub stats: SearchStats,
}

/// Embeds queries and runs them against a [`VectorStore`].
///
/// The planner owns no model selection: it must be given the same
/// [`EmbeddingProvider`] that ingestion used.
pub struct QueryPlanner {
    config: SearchConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl QueryPlanner {
    /// Create a planner over explicit collaborators.
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

    /// Run a search and format the hits.
    ///
    /// Zero hits is a successful, empty report. If fewer records are stored
    /// than the limit, all of them are returned.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingFailure`](crate::SearchError::EmbeddingFailure) if
    /// the query cannot be embedded and
    /// [`StoreQueryFailure`](crate::SearchError::StoreQueryFailure) (or
    /// [`DimensionMismatch`](crate::SearchError::DimensionMismatch)) if the
    /// store rejects the query. No partial results are returned.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let started = Instant::now();
        let collection = self.config.collection_name.as_str();

        let query_vector = self.embedding_provider.embed(&request.query).await.map_err(|e| {
            error!(
                provider = self.embedding_provider.name(),
                error = %e,
                "embedding failed during query"
            );
            e
        })?;

        let hits = self.retrieve(collection, &query_vector, &request.filters).await.map_err(|e| {
            error!(
                collection,
                backend = self.vector_store.backend(),
                error = %e,
                "nearest-neighbor query failed"
            );
            e
        })?;

        let report =
            SearchReport::from_hits(&hits, self.config.snippet_chars, self.config.always_ellipsis);
        let stats = SearchStats { elapsed: started.elapsed(), result_count: report.len() };

        info!(
            collection,
            result_count = stats.result_count,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "search completed"
        );
        Ok(SearchOutcome { report, stats })
    }

    async fn retrieve(
        &self,
        collection: &str,
        vector: &[f32],
        filters: &FilterSpec,
    ) -> Result<Vec<SearchHit>> {
        let limit = filters.limit();
        let predicates = filters.predicates();

        if predicates.is_empty() {
            return self.vector_store.query_nearest(collection, vector, limit).await;
        }

        match self.config.filter_mode {
            FilterMode::Ignore => {
                debug!(
                    collection,
                    predicates = ?predicates,
                    "filters built but not applied (filter_mode = ignore)"
                );
                self.vector_store.query_nearest(collection, vector, limit).await
            }
            FilterMode::PostRetrieval => {
                let stored = self.vector_store.count(collection).await?;
                let candidates = stored.min(self.config.max_filter_candidates).max(limit);
                let hits = self.vector_store.query_nearest(collection, vector, candidates).await?;
                let fetched = hits.len();
                let kept: Vec<SearchHit> = hits
                    .into_iter()
                    .filter(|hit| predicates.iter().all(|p| p.matches(&hit.record)))
                    .take(limit)
                    .collect();
                debug!(collection, fetched, kept = kept.len(), "applied post-retrieval filters");
                Ok(kept)
            }
        }
    }

    /// The form-style entry point: raw text fields in, `(report, stats)`
    /// strings out.
    ///
    /// `limit` of `None` uses the configured default. Blank filter fields
    /// mean "no constraint".
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterInput`](crate::SearchError::InvalidFilterInput)
    /// for a limit outside `1..=20`, otherwise the errors of
    /// [`search`](Self::search).
    pub async fn search_form(
        &self,
        query: &str,
        publication_year: &str,
        journal: &str,
        keywords: &str,
        limit: Option<usize>,
    ) -> Result<(String, String)> {
        let filters = FilterSpec::new(limit.unwrap_or(self.config.default_result_limit))?
            .with_publication_year(publication_year)
            .with_journal(journal)
            .with_keywords(keywords);
        let outcome = self.search(&SearchRequest::new(query, filters)).await?;
        Ok((outcome.report.to_string(), outcome.stats.to_string()))
    }

    /// The collection this planner queries.
    pub fn collection(&self) -> &str {
        &self.config.collection_name
    }
}
