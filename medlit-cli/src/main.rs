//! # medlit
//!
//! Command-line front end for medical literature search.
//!
//! ## Commands
//!
//! - `medlit ingest` - Embed and store documents
//! - `medlit search <QUERY>` - Run one search with optional filters
//! - `medlit console` - Interactive search prompt
//!
//! ## Examples
//!
//! ```bash
//! # Offline search over the built-in sample papers
//! medlit search "diabetes treatment" -n 2
//!
//! # Apply filters instead of only building them
//! medlit --filter-mode apply search "treatment" --journal "Diabetes Care"
//!
//! # Use a self-hosted embedding server and a JSON corpus
//! MEDLIT_EMBEDDING_ENDPOINT=http://localhost:8080/v1/embeddings \
//!     medlit --embedding-dimensions 768 --documents papers.json console
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use medlit_rag::{FilterSpec, IngestReport, MedicalSearch, SearchRequest};
use tracing::info;

mod backend;
mod cli;
mod console;
mod output;
mod telemetry;

use cli::{BackendArgs, Cli, Command, OutputFormat, SearchArgs};

async fn ingest(search: &MedicalSearch, args: &BackendArgs) -> Result<IngestReport> {
    let documents = backend::documents(args)?;
    info!(document_count = documents.len(), "ingesting documents");
    search.ingest(&documents).await.context("ingestion failed")
}

async fn search_once(
    search: &MedicalSearch,
    args: &SearchArgs,
    format: OutputFormat,
) -> Result<()> {
    let limit = args.limit.unwrap_or(search.config().default_result_limit);
    let filters = FilterSpec::new(limit)?
        .with_publication_year(args.year.clone().unwrap_or_default())
        .with_journal(args.journal.clone().unwrap_or_default())
        .with_keywords(args.keywords.clone().unwrap_or_default());
    let outcome = search
        .search(&SearchRequest::new(args.query.clone(), filters))
        .await
        .context("search failed")?;
    println!("{}", output::format_search(&args.query, &outcome, format));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let search = backend::connect(&cli.backend).await?;

    match &cli.command {
        Command::Ingest => {
            let report = ingest(&search, &cli.backend).await?;
            println!("{}", output::format_ingest(&report, cli.format));
        }
        Command::Search(args) => {
            if backend::is_ephemeral(&cli.backend) {
                // stdout carries the search result; the ingest line goes to stderr.
                let report = ingest(&search, &cli.backend).await?;
                eprintln!("{}", output::format_ingest(&report, OutputFormat::Text));
            }
            search_once(&search, args, cli.format).await?;
        }
        Command::Console => {
            if backend::is_ephemeral(&cli.backend) {
                let report = ingest(&search, &cli.backend).await?;
                println!("{}", output::format_ingest(&report, OutputFormat::Text));
            }
            console::run(&search).await?;
        }
    }
    Ok(())
}
