//! Error types for the `medlit-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting or searching medical literature.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The embedding provider was unreachable or rejected the input text.
    #[error("Embedding failure ({provider}): {message}")]
    EmbeddingFailure {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A batch insert was rejected by the document store, partially or wholly.
    #[error("Store write failure ({backend}): {message}")]
    StoreWriteFailure {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A nearest-neighbor query was rejected by the document store.
    #[error("Store query failure ({backend}): {message}")]
    StoreQueryFailure {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A search filter value was out of range.
    #[error("Invalid filter input: {0}")]
    InvalidFilterInput(String),

    /// A source document could not be read or was missing a required field.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A vector did not have the dimensionality of its collection or provider.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality required by the collection or provider.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
