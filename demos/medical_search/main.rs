//! # Medical Search Example
//!
//! Ingests the four built-in sample papers, then runs three example form
//! queries, once with filters ignored and once with filters applied.
//!
//! Uses `HashingEmbeddingProvider` and `InMemoryVectorStore` so it runs with
//! **zero API keys**.
//!
//! Run: `cargo run -p medlit-demos --example medical_search`

use std::sync::Arc;

use medlit_rag::{
    FilterMode, HashingEmbeddingProvider, InMemoryVectorStore, MedicalSearch, SearchConfig,
    sample_documents,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // (query, publication year, journal, keywords)
    let examples = [
        ("COVID-19 treatment options", "2023", "", "clinical trial"),
        ("diabetes management elderly patients", "", "Diabetes Care", ""),
        ("hypertension guidelines", "2023", "", "treatment"),
    ];

    for mode in [FilterMode::Ignore, FilterMode::PostRetrieval] {
        println!("=== filter mode: {mode:?} ===\n");

        // -- 1. One provider for both ingestion and queries ----------------
        let search = MedicalSearch::builder()
            .config(SearchConfig::builder().filter_mode(mode).build()?)
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()?;

        // -- 2. Ingest the sample corpus ----------------------------------
        search.ensure_collection().await?;
        let ingested = search.ingest(&sample_documents()).await?;
        println!(
            "Processed {} documents in {:.2} seconds\n",
            ingested.documents_processed,
            ingested.elapsed.as_secs_f64()
        );

        // -- 3. Run the example queries -----------------------------------
        for (query, year, journal, keywords) in examples {
            println!("Query: \"{query}\" year={year:?} journal={journal:?} keywords={keywords:?}");
            let (report, stats) =
                search.search_form(query, year, journal, keywords, Some(2)).await?;
            println!("{report}{stats}\n");
        }
    }

    Ok(())
}
