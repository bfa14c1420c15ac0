//! Filtered semantic search over medical literature.
//!
//! This crate provides:
//! - [`MedicalDocument`] and [`IndexedRecord`] data types
//! - The [`EmbeddingProvider`] and [`VectorStore`] seams, with an offline
//!   [`HashingEmbeddingProvider`] and an [`InMemoryVectorStore`]
//! - An [`IngestionPipeline`] that embeds documents and writes them in one batch
//! - A [`QueryPlanner`] that turns a query plus optional filters into a
//!   ranked, formatted report
//! - The [`MedicalSearch`] facade tying both to a single provider
//!
//! # Feature flags
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`] for OpenAI-compatible
//!   embedding endpoints
//! - `chroma`: [`chroma::ChromaVectorStore`] for a Chroma server
//! - `full`: both of the above

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod hashing;
pub mod ingest;
pub mod inmemory;
pub mod planner;
pub mod report;
pub mod samples;
pub mod service;
pub mod vectorstore;

#[cfg(feature = "chroma")]
pub mod chroma;
#[cfg(feature = "openai")]
pub mod openai;

pub use config::{DEFAULT_COLLECTION, IdScheme, SearchConfig, SearchConfigBuilder};
pub use document::{
    IndexedRecord, MedicalDocument, SearchHit, load_documents, parse_documents,
};
pub use embedding::EmbeddingProvider;
pub use error::{Result, SearchError};
pub use filter::{FieldPredicate, FilterMode, FilterSpec, MAX_RESULT_LIMIT, MIN_RESULT_LIMIT};
pub use hashing::HashingEmbeddingProvider;
pub use ingest::{IngestReport, IngestionPipeline};
pub use inmemory::InMemoryVectorStore;
pub use planner::{QueryPlanner, SearchOutcome, SearchRequest};
pub use report::{ReportEntry, SearchReport, SearchStats};
pub use samples::sample_documents;
pub use service::{MedicalSearch, MedicalSearchBuilder};
pub use vectorstore::VectorStore;
