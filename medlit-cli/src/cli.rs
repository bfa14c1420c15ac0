//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use medlit_rag::{DEFAULT_COLLECTION, FilterMode, IdScheme, SearchConfig};

#[derive(Parser, Debug)]
#[command(name = "medlit")]
#[command(about = "Semantic search over medical literature records")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process-local store; documents are ingested on every run
    #[default]
    Memory,
    /// Chroma server (requires the `chroma` feature)
    Chroma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterModeArg {
    /// Build filters but search unfiltered
    Ignore,
    /// Drop results that fail a filter
    Apply,
}

impl From<FilterModeArg> for FilterMode {
    fn from(arg: FilterModeArg) -> Self {
        match arg {
            FilterModeArg::Ignore => FilterMode::Ignore,
            FilterModeArg::Apply => FilterMode::PostRetrieval,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IdSchemeArg {
    Sequential,
    Uuid,
}

impl From<IdSchemeArg> for IdScheme {
    fn from(arg: IdSchemeArg) -> Self {
        match arg {
            IdSchemeArg::Sequential => IdScheme::Sequential,
            IdSchemeArg::Uuid => IdScheme::Uuid,
        }
    }
}

/// Embedding provider, store, and search settings.
#[derive(Args, Debug)]
pub struct BackendArgs {
    /// OpenAI-compatible embeddings endpoint; omit to use the offline hashing provider
    #[arg(long, global = true, env = "MEDLIT_EMBEDDING_ENDPOINT")]
    pub embedding_endpoint: Option<String>,

    /// Embedding model name sent to the endpoint
    #[arg(long, global = true, env = "MEDLIT_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Dimensionality of the endpoint's vectors
    #[arg(long, global = true, env = "MEDLIT_EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: Option<usize>,

    /// Bearer key for the embeddings endpoint
    #[arg(long, global = true, env = "MEDLIT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Store backend
    #[arg(
        long,
        global = true,
        value_enum,
        env = "MEDLIT_STORE",
        default_value_t = StoreKind::Memory
    )]
    pub store: StoreKind,

    /// Chroma server URL
    #[arg(
        long,
        global = true,
        env = "MEDLIT_CHROMA_URL",
        default_value = "http://localhost:8000"
    )]
    pub chroma_url: String,

    /// Collection holding the records
    #[arg(long, global = true, env = "MEDLIT_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Result count when none is given
    #[arg(long, global = true, env = "MEDLIT_DEFAULT_LIMIT", default_value_t = 5)]
    pub default_limit: usize,

    /// Whether journal/year/keyword filters restrict results
    #[arg(
        long,
        global = true,
        value_enum,
        env = "MEDLIT_FILTER_MODE",
        default_value_t = FilterModeArg::Ignore
    )]
    pub filter_mode: FilterModeArg,

    /// How record ids are generated
    #[arg(long, global = true, value_enum, default_value_t = IdSchemeArg::Sequential)]
    pub id_scheme: IdSchemeArg,

    /// Concurrent embedding calls during ingestion
    #[arg(long, global = true, default_value_t = 1)]
    pub concurrency: usize,

    /// JSON array of documents to ingest; defaults to the built-in samples
    #[arg(long, global = true)]
    pub documents: Option<PathBuf>,
}

impl BackendArgs {
    /// Build a validated [`SearchConfig`] from the flags.
    pub fn search_config(&self) -> medlit_rag::Result<SearchConfig> {
        let mut builder = SearchConfig::builder()
            .collection_name(self.collection.clone())
            .default_result_limit(self.default_limit)
            .filter_mode(self.filter_mode.into())
            .id_scheme(self.id_scheme.into())
            .ingest_concurrency(self.concurrency);
        if let Some(endpoint) = &self.embedding_endpoint {
            builder = builder.embedding_endpoint(endpoint.clone());
        }
        if let Some(model) = &self.embedding_model {
            builder = builder.embedding_model(model.clone());
        }
        if let Some(dims) = self.embedding_dimensions {
            builder = builder.embedding_dimensions(dims);
        }
        builder.build()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest documents into the store
    Ingest,

    /// Run one search and print the report
    Search(SearchArgs),

    /// Interactive search prompt
    Console,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Patient symptoms or medical condition
    pub query: String,

    /// Publication year filter, e.g. 2023
    #[arg(long)]
    pub year: Option<String>,

    /// Journal filter, e.g. "Diabetes Care"
    #[arg(long)]
    pub journal: Option<String>,

    /// Keywords filter, e.g. "clinical trials"
    #[arg(long)]
    pub keywords: Option<String>,

    /// Number of results (1-20)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
