//! Configuration for ingestion and search.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::filter::{FilterMode, MAX_RESULT_LIMIT, MIN_RESULT_LIMIT};

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "medical_documents";

/// How ingestion assigns record ids.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// `doc_<n>` by zero-based position in the ingested batch. Ids repeat
    /// across ingestion runs.
    #[default]
    Sequential,
    /// A random v4 UUID per record.
    Uuid,
}

/// Configuration parameters shared by ingestion and search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// OpenAI-compatible embeddings endpoint. `None` selects the local
    /// hashing provider.
    pub embedding_endpoint: Option<String>,
    /// Model name sent to the endpoint. `None` keeps the provider default.
    pub embedding_model: Option<String>,
    /// Vector size the endpoint model returns. `None` keeps the provider
    /// default.
    pub embedding_dimensions: Option<usize>,
    /// Store collection holding the records.
    pub collection_name: String,
    /// Result count used when a caller does not supply one.
    pub default_result_limit: usize,
    /// Whether structured filters restrict results.
    pub filter_mode: FilterMode,
    /// How record ids are generated.
    pub id_scheme: IdScheme,
    /// Maximum embedding calls in flight during ingestion.
    pub ingest_concurrency: usize,
    /// Maximum neighbours fetched before post-retrieval filtering.
    pub max_filter_candidates: usize,
    /// Snippet budget in characters.
    pub snippet_chars: usize,
    /// Append the ellipsis marker even when the text fits the budget.
    pub always_ellipsis: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            embedding_endpoint: None,
            embedding_model: None,
            embedding_dimensions: None,
            collection_name: DEFAULT_COLLECTION.to_string(),
            default_result_limit: 5,
            filter_mode: FilterMode::default(),
            id_scheme: IdScheme::default(),
            ingest_concurrency: 1,
            max_filter_candidates: 1000,
            snippet_chars: 300,
            always_ellipsis: true,
        }
    }
}

impl SearchConfig {
    /// Create a new builder for constructing a [`SearchConfig`].
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Check that all parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.collection_name.trim().is_empty() {
            return Err(SearchError::ConfigError("collection_name must not be empty".to_string()));
        }
        if !(MIN_RESULT_LIMIT..=MAX_RESULT_LIMIT).contains(&self.default_result_limit) {
            let limit = self.default_result_limit;
            return Err(SearchError::ConfigError(format!(
                "default_result_limit ({limit}) must be between {MIN_RESULT_LIMIT} and \
                 {MAX_RESULT_LIMIT}"
            )));
        }
        if self.ingest_concurrency == 0 {
            return Err(SearchError::ConfigError(
                "ingest_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.max_filter_candidates == 0 {
            return Err(SearchError::ConfigError(
                "max_filter_candidates must be greater than zero".to_string(),
            ));
        }
        if self.snippet_chars == 0 {
            return Err(SearchError::ConfigError(
                "snippet_chars must be greater than zero".to_string(),
            ));
        }
        if self.embedding_endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(SearchError::ConfigError(
                "embedding_endpoint must not be blank".to_string(),
            ));
        }
        if self.embedding_dimensions == Some(0) {
            return Err(SearchError::ConfigError(
                "embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Set the embeddings endpoint.
    pub fn embedding_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.embedding_endpoint = Some(endpoint.into());
        self
    }

    /// Set the model requested from the embeddings endpoint.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = Some(model.into());
        self
    }

    /// Set the vector size the endpoint model returns.
    pub fn embedding_dimensions(mut self, dims: usize) -> Self {
        self.config.embedding_dimensions = Some(dims);
        self
    }

    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the result count used when none is supplied.
    pub fn default_result_limit(mut self, limit: usize) -> Self {
        self.config.default_result_limit = limit;
        self
    }

    /// Choose whether filters are applied.
    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.config.filter_mode = mode;
        self
    }

    /// Choose the id scheme.
    pub fn id_scheme(mut self, scheme: IdScheme) -> Self {
        self.config.id_scheme = scheme;
        self
    }

    /// Set the number of concurrent embedding calls during ingestion.
    pub fn ingest_concurrency(mut self, concurrency: usize) -> Self {
        self.config.ingest_concurrency = concurrency;
        self
    }

    /// Set the candidate cap for post-retrieval filtering.
    pub fn max_filter_candidates(mut self, max: usize) -> Self {
        self.config.max_filter_candidates = max;
        self
    }

    /// Set the snippet budget in characters.
    pub fn snippet_chars(mut self, chars: usize) -> Self {
        self.config.snippet_chars = chars;
        self
    }

    /// Append the ellipsis only to snippets that were actually cut.
    pub fn ellipsis_only_when_truncated(mut self) -> Self {
        self.config.always_ellipsis = false;
        self
    }

    /// Build the [`SearchConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigError`] if any field is out of range.
    pub fn build(self) -> Result<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = SearchConfig::builder().build().unwrap();
        assert_eq!(config.collection_name, "medical_documents");
        assert_eq!(config.default_result_limit, 5);
        assert_eq!(config.filter_mode, FilterMode::Ignore);
        assert_eq!(config.id_scheme, IdScheme::Sequential);
        assert_eq!(config.snippet_chars, 300);
        assert!(config.always_ellipsis);
        assert!(config.embedding_endpoint.is_none());
    }

    #[test]
    fn out_of_range_values_rejected() {
        for builder in [
            SearchConfig::builder().default_result_limit(0),
            SearchConfig::builder().default_result_limit(21),
            SearchConfig::builder().ingest_concurrency(0),
            SearchConfig::builder().max_filter_candidates(0),
            SearchConfig::builder().snippet_chars(0),
            SearchConfig::builder().collection_name("  "),
            SearchConfig::builder().embedding_endpoint(""),
            SearchConfig::builder().embedding_dimensions(0),
        ] {
            assert!(matches!(builder.build(), Err(SearchError::ConfigError(_))));
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"collection_name": "papers", "filter_mode": "post_retrieval", "id_scheme": "uuid"}"#,
        )
        .unwrap();
        assert_eq!(config.collection_name, "papers");
        assert_eq!(config.filter_mode, FilterMode::PostRetrieval);
        assert_eq!(config.id_scheme, IdScheme::Uuid);
        assert_eq!(config.default_result_limit, 5);
        config.validate().unwrap();
    }
}
