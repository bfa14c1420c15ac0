//! Provider and store selection from command-line settings.

use std::sync::Arc;

use anyhow::{Context, Result};
use medlit_rag::{
    IdScheme, InMemoryVectorStore, MedicalDocument, MedicalSearch, VectorStore, load_documents,
    sample_documents,
};
use tracing::warn;

use crate::cli::{BackendArgs, StoreKind};

#[cfg(feature = "chroma")]
fn chroma_store(url: &str) -> Result<Arc<dyn VectorStore>> {
    let store = medlit_rag::chroma::ChromaVectorStore::new(url).context("invalid chroma url")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "chroma"))]
fn chroma_store(_url: &str) -> Result<Arc<dyn VectorStore>> {
    anyhow::bail!("this build does not include the chroma store; rebuild with `--features chroma`")
}

/// Chroma skips ids it already holds, so sequential ids make re-ingestion a
/// silent no-op there.
fn reingest_is_silent(args: &BackendArgs) -> bool {
    args.store == StoreKind::Chroma && IdScheme::from(args.id_scheme) == IdScheme::Sequential
}

fn vector_store(args: &BackendArgs) -> Result<Arc<dyn VectorStore>> {
    if reingest_is_silent(args) {
        warn!("re-ingesting into chroma with sequential ids writes nothing, use --id-scheme uuid");
    }
    match args.store {
        StoreKind::Memory => Ok(Arc::new(InMemoryVectorStore::new())),
        StoreKind::Chroma => chroma_store(&args.chroma_url),
    }
}

/// Build the search facade and make sure its collection exists.
///
/// The embedding provider follows the configured endpoint.
pub async fn connect(args: &BackendArgs) -> Result<MedicalSearch> {
    let config = args.search_config().context("invalid configuration")?;
    let mut builder = MedicalSearch::builder().config(config).vector_store(vector_store(args)?);
    if let Some(key) = &args.api_key {
        builder = builder.embedding_api_key(key.clone());
    }
    let search = builder.build().context("failed to build search")?;
    search.ensure_collection().await.context("failed to prepare collection")?;
    Ok(search)
}

/// Documents named by `--documents`, or the built-in samples.
pub fn documents(args: &BackendArgs) -> Result<Vec<MedicalDocument>> {
    match &args.documents {
        Some(path) => load_documents(path)
            .with_context(|| format!("failed to load documents from {}", path.display())),
        None => Ok(sample_documents()),
    }
}

/// Whether searches need a fresh ingestion first.
pub fn is_ephemeral(args: &BackendArgs) -> bool {
    args.store == StoreKind::Memory
}
