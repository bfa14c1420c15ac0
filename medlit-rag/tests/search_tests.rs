//! End-to-end tests for ingestion and the query planner using in-process
//! doubles for the embedding provider and the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use medlit_rag::document::META_KEYWORDS;
use medlit_rag::{
    EmbeddingProvider, FilterMode, FilterSpec, HashingEmbeddingProvider, IdScheme, IndexedRecord,
    InMemoryVectorStore, IngestionPipeline, MedicalDocument, MedicalSearch, QueryPlanner,
    SearchConfig, SearchError, SearchHit, SearchRequest, VectorStore, sample_documents,
};

// ---------------------------------------------------------------------------
// Doubles
// ---------------------------------------------------------------------------

/// Provider that is always unreachable.
struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> medlit_rag::Result<Vec<f32>> {
        Err(SearchError::EmbeddingFailure {
            provider: "failing".into(),
            message: "connection refused".into(),
        })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// Provider whose vectors are shorter than it claims.
struct ShortProvider;

#[async_trait]
impl EmbeddingProvider for ShortProvider {
    async fn embed(&self, _text: &str) -> medlit_rag::Result<Vec<f32>> {
        Ok(vec![1.0; 4])
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// Store wrapper that counts calls, remembers the last query limit and can
/// be told to reject queries.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryVectorStore,
    insert_calls: AtomicUsize,
    last_query_limit: AtomicUsize,
    reject_queries: bool,
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> medlit_rag::Result<()> {
        self.inner.create_collection(name, dimensions).await
    }

    async fn delete_collection(&self, name: &str) -> medlit_rag::Result<()> {
        self.inner.delete_collection(name).await
    }

    async fn insert_batch(
        &self,
        collection: &str,
        records: &[IndexedRecord],
    ) -> medlit_rag::Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_batch(collection, records).await
    }

    async fn count(&self, collection: &str) -> medlit_rag::Result<usize> {
        self.inner.count(collection).await
    }

    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> medlit_rag::Result<Vec<SearchHit>> {
        self.last_query_limit.store(limit, Ordering::SeqCst);
        if self.reject_queries {
            return Err(SearchError::StoreQueryFailure {
                backend: "counting".into(),
                message: "unavailable".into(),
            });
        }
        self.inner.query_nearest(collection, vector, limit).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(
    config: SearchConfig,
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
) -> MedicalSearch {
    MedicalSearch::builder()
        .config(config)
        .embedding_provider(provider)
        .vector_store(store)
        .build()
        .unwrap()
}

async fn sample_search(config: SearchConfig) -> (MedicalSearch, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let search = build(config, Arc::new(HashingEmbeddingProvider::default()), store.clone());
    search.ensure_collection().await.unwrap();
    search.ingest(&sample_documents()).await.unwrap();
    (search, store)
}

async fn all_records(search: &MedicalSearch) -> Vec<IndexedRecord> {
    let zero = vec![0.0; search.embedding_provider().dimensions()];
    search
        .vector_store()
        .query_nearest(&search.config().collection_name, &zero, usize::MAX)
        .await
        .unwrap()
        .into_iter()
        .map(|hit| hit.record)
        .collect()
}

fn titles(report: &medlit_rag::SearchReport) -> Vec<&str> {
    report.entries.iter().map(|e| e.title.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingestion_assigns_sequential_ids_in_input_order() {
    let (search, store) = sample_search(SearchConfig::default()).await;

    assert_eq!(search.record_count().await.unwrap(), 4);
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);

    // A zero query vector scores every record 0.0, so insertion order is kept.
    let records = all_records(&search).await;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2", "doc_3"]);
    for (record, doc) in records.iter().zip(sample_documents()) {
        assert_eq!(record.text, doc.embedding_text());
    }
}

#[tokio::test]
async fn ingestion_report_lists_ids_and_count() {
    let store = Arc::new(InMemoryVectorStore::new());
    let search =
        build(SearchConfig::default(), Arc::new(HashingEmbeddingProvider::default()), store);
    search.ensure_collection().await.unwrap();

    let report = search.ingest(&sample_documents()).await.unwrap();
    assert_eq!(report.documents_processed, 4);
    assert_eq!(report.ids, vec!["doc_0", "doc_1", "doc_2", "doc_3"]);
}

#[tokio::test]
async fn concurrent_embedding_keeps_alignment_and_single_batch() {
    let config = SearchConfig::builder().ingest_concurrency(3).build().unwrap();
    let (search, store) = sample_search(config).await;

    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
    let provider = HashingEmbeddingProvider::default();
    for (record, doc) in all_records(&search).await.iter().zip(sample_documents()) {
        assert_eq!(record.text, doc.embedding_text());
        assert_eq!(record.embedding, provider.embed(&doc.embedding_text()).await.unwrap());
    }
}

#[tokio::test]
async fn empty_ingestion_is_a_no_op() {
    let store = Arc::new(CountingStore::default());
    let provider = Arc::new(HashingEmbeddingProvider::default());
    let search = build(SearchConfig::default(), provider, store.clone());
    search.ensure_collection().await.unwrap();

    let report = search.ingest(&[]).await.unwrap();
    assert_eq!(report.documents_processed, 0);
    assert!(report.ids.is_empty());
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.record_count().await.unwrap(), 0);
}

#[tokio::test]
async fn keywords_read_back_comma_joined() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    let records = all_records(&search).await;
    let elderly = records.iter().find(|r| r.id == "doc_1").unwrap();
    assert_eq!(elderly.field(META_KEYWORDS), "diabetes,elderly care,treatment");
}

#[tokio::test]
async fn embedding_failure_aborts_ingestion_before_store_write() {
    let store = Arc::new(CountingStore::default());
    let search = build(SearchConfig::default(), Arc::new(FailingProvider), store.clone());
    search.ensure_collection().await.unwrap();

    let err = search.ingest(&sample_documents()).await.unwrap_err();
    assert!(matches!(err, SearchError::EmbeddingFailure { .. }));
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.record_count().await.unwrap(), 0);
}

#[tokio::test]
async fn wrong_sized_vectors_rejected_before_store_write() {
    let store = Arc::new(CountingStore::default());
    let search = build(SearchConfig::default(), Arc::new(ShortProvider), store.clone());
    search.ensure_collection().await.unwrap();

    let err = search.ingest(&sample_documents()).await.unwrap_err();
    assert!(matches!(err, SearchError::DimensionMismatch { expected: 8, actual: 4 }));
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sequential_ids_collide_across_runs_but_uuids_do_not() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    let err = search.ingest(&sample_documents()).await.unwrap_err();
    assert!(matches!(err, SearchError::StoreWriteFailure { .. }));
    assert_eq!(search.record_count().await.unwrap(), 4);

    let config = SearchConfig::builder().id_scheme(IdScheme::Uuid).build().unwrap();
    let (search, _) = sample_search(config).await;
    let second = search.ingest(&sample_documents()).await.unwrap();
    assert_eq!(search.record_count().await.unwrap(), 8);
    assert!(second.ids.iter().all(|id| !id.starts_with("doc_")));
}

#[tokio::test]
async fn ingestion_without_collection_is_a_store_write_failure() {
    let search = build(
        SearchConfig::default(),
        Arc::new(HashingEmbeddingProvider::default()),
        Arc::new(InMemoryVectorStore::new()),
    );
    let err = search.ingest(&sample_documents()).await.unwrap_err();
    assert!(matches!(err, SearchError::StoreWriteFailure { .. }));
}

// ---------------------------------------------------------------------------
// Query planner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn diabetes_treatment_returns_two_formatted_blocks() {
    let (search, _) = sample_search(SearchConfig::default()).await;

    let (report, stats) =
        search.search_form("diabetes treatment", "", "", "", Some(2)).await.unwrap();

    assert!(report.starts_with("Search Results:\n\n"));
    assert_eq!(report.matches("Result ").count(), 2);
    for label in ["Title: ", "Journal: ", "DOI: ", "Keywords: ", "Abstract: "] {
        assert_eq!(report.lines().filter(|l| l.starts_with(label)).count(), 2, "{label}");
    }
    for line in report.lines().filter(|l| l.starts_with("Abstract: ")) {
        let snippet = line.trim_start_matches("Abstract: ");
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= 303);
    }
    assert!(stats.starts_with("Search completed in "));
    assert!(stats.ends_with(" seconds"));
}

#[tokio::test]
async fn diabetes_query_ranks_diabetes_papers_first() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    let request = SearchRequest::new("diabetes treatment", FilterSpec::new(2).unwrap());
    let outcome = search.search(&request).await.unwrap();

    assert_eq!(
        titles(&outcome.report),
        vec!["Diabetes Management in the Elderly", "Diabetes mellitus and its treatment"]
    );
    assert_eq!(outcome.report.entries[0].position, 1);
    assert_eq!(outcome.report.entries[1].position, 2);
    assert!(outcome.report.entries[0].score >= outcome.report.entries[1].score);
    assert_eq!(outcome.stats.result_count, 2);
}

#[tokio::test]
async fn stored_text_retrieves_its_own_record_first() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    let provider = HashingEmbeddingProvider::default();

    for (index, doc) in sample_documents().iter().enumerate() {
        let vector = provider.embed(&doc.embedding_text()).await.unwrap();
        let hits = search
            .vector_store()
            .query_nearest(&search.config().collection_name, &vector, 4)
            .await
            .unwrap();
        assert_eq!(hits[0].record.id, format!("doc_{index}"));
        assert!((hits[0].score - 1.0).abs() < 1e-4);
    }
}

#[tokio::test]
async fn result_count_is_min_of_limit_and_stored() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    for (limit, expected) in [(1, 1), (3, 3), (4, 4), (10, 4), (20, 4)] {
        let filters = FilterSpec::new(limit).unwrap();
        let outcome = search.search(&SearchRequest::new("treatment", filters)).await.unwrap();
        assert_eq!(outcome.report.len(), expected, "limit {limit}");
    }
}

#[tokio::test]
async fn default_limit_applies_when_none_given() {
    let config = SearchConfig::builder().default_result_limit(3).build().unwrap();
    let (search, _) = sample_search(config).await;
    let (report, _) = search.search_form("treatment", "", "", "", None).await.unwrap();
    assert_eq!(report.matches("Result ").count(), 3);
}

#[tokio::test]
async fn empty_store_yields_header_only_report() {
    let search = build(
        SearchConfig::default(),
        Arc::new(HashingEmbeddingProvider::default()),
        Arc::new(InMemoryVectorStore::new()),
    );
    search.ensure_collection().await.unwrap();

    let (report, stats) = search.search_form("anything", "", "", "", Some(5)).await.unwrap();
    assert_eq!(report, "Search Results:\n\n");
    assert!(stats.starts_with("Search completed in "));
}

#[tokio::test]
async fn out_of_range_limit_is_invalid_filter_input() {
    let (search, _) = sample_search(SearchConfig::default()).await;
    for limit in [0, 21] {
        let err = search.search_form("diabetes", "", "", "", Some(limit)).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidFilterInput(_)), "limit {limit}");
    }
}

#[tokio::test]
async fn ignore_mode_runs_unfiltered() {
    let (search, _) = sample_search(SearchConfig::default()).await;

    let (unfiltered, _) =
        search.search_form("diabetes treatment", "", "", "", Some(2)).await.unwrap();
    let (filtered, _) = search
        .search_form("diabetes treatment", "1999", "Cardiology Journal", "insulin", Some(2))
        .await
        .unwrap();
    assert_eq!(filtered, unfiltered);
}

#[tokio::test]
async fn post_retrieval_mode_applies_every_predicate() {
    let config = SearchConfig::builder().filter_mode(FilterMode::PostRetrieval).build().unwrap();
    let (search, _) = sample_search(config).await;

    let journal = FilterSpec::new(5).unwrap().with_journal("Cardiology Journal");
    let outcome = search.search(&SearchRequest::new("diabetes treatment", journal)).await.unwrap();
    assert_eq!(titles(&outcome.report), vec!["Hypertension Treatment Guidelines"]);

    let keywords =
        FilterSpec::new(5).unwrap().with_publication_year("2023").with_keywords("insulin");
    let outcome = search.search(&SearchRequest::new("treatment", keywords)).await.unwrap();
    assert_eq!(titles(&outcome.report), vec!["Diabetes mellitus and its treatment"]);

    let none = FilterSpec::new(5).unwrap().with_publication_year("1999");
    let outcome = search.search(&SearchRequest::new("treatment", none)).await.unwrap();
    assert!(outcome.report.is_empty());
    assert_eq!(outcome.report.to_string(), "Search Results:\n\n");
}

#[tokio::test]
async fn post_retrieval_mode_still_honours_limit_and_order() {
    let config = SearchConfig::builder().filter_mode(FilterMode::PostRetrieval).build().unwrap();
    let (search, _) = sample_search(config).await;

    let spec = FilterSpec::new(2).unwrap().with_keywords("treatment");
    let outcome = search.search(&SearchRequest::new("diabetes treatment", spec)).await.unwrap();
    assert_eq!(
        titles(&outcome.report),
        vec!["Diabetes Management in the Elderly", "Diabetes mellitus and its treatment"]
    );
}

#[tokio::test]
async fn post_retrieval_candidate_cap_can_hide_matches() {
    // "diabetes treatment" ranks the hypertension paper third.
    let journal = || FilterSpec::new(1).unwrap().with_journal("Cardiology Journal");

    let capped = SearchConfig::builder()
        .filter_mode(FilterMode::PostRetrieval)
        .max_filter_candidates(2)
        .build()
        .unwrap();
    let (search, store) = sample_search(capped).await;
    let outcome =
        search.search(&SearchRequest::new("diabetes treatment", journal())).await.unwrap();
    assert_eq!(store.last_query_limit.load(Ordering::SeqCst), 2);
    assert!(outcome.report.is_empty());

    let uncapped = SearchConfig::builder().filter_mode(FilterMode::PostRetrieval).build().unwrap();
    let (search, store) = sample_search(uncapped).await;
    let outcome =
        search.search(&SearchRequest::new("diabetes treatment", journal())).await.unwrap();
    assert_eq!(store.last_query_limit.load(Ordering::SeqCst), 4);
    assert_eq!(titles(&outcome.report), vec!["Hypertension Treatment Guidelines"]);
}

#[tokio::test]
async fn query_embedding_failure_fails_the_search() {
    let store = Arc::new(InMemoryVectorStore::new());
    store.create_collection("medical_documents", 8).await.unwrap();
    let search = build(SearchConfig::default(), Arc::new(FailingProvider), store);

    let err = search.search_form("diabetes", "", "", "", Some(2)).await.unwrap_err();
    assert!(matches!(err, SearchError::EmbeddingFailure { .. }));
}

#[tokio::test]
async fn store_query_failure_fails_the_search() {
    let store = Arc::new(CountingStore { reject_queries: true, ..Default::default() });
    let search =
        build(SearchConfig::default(), Arc::new(HashingEmbeddingProvider::default()), store);
    search.ensure_collection().await.unwrap();
    search.ingest(&sample_documents()).await.unwrap();

    let err = search.search_form("diabetes", "", "", "", Some(2)).await.unwrap_err();
    assert!(matches!(err, SearchError::StoreQueryFailure { .. }));
}

#[tokio::test]
async fn long_abstracts_are_cut_to_budget() {
    let store = Arc::new(InMemoryVectorStore::new());
    let search =
        build(SearchConfig::default(), Arc::new(HashingEmbeddingProvider::default()), store);
    search.ensure_collection().await.unwrap();
    let doc = MedicalDocument {
        title: "Long".into(),
        abstract_text: "word ".repeat(200),
        publication_date: "2020".into(),
        journal: "J".into(),
        doi: "d".into(),
        keywords: vec![],
    };
    search.ingest(&[doc]).await.unwrap();

    let outcome =
        search.search(&SearchRequest::new("word", FilterSpec::new(1).unwrap())).await.unwrap();
    let snippet = &outcome.report.entries[0].abstract_snippet;
    assert_eq!(snippet.chars().count(), 303);
    assert!(snippet.starts_with("Long word word"));
    assert!(snippet.ends_with("..."));
}

#[test]
fn components_reject_invalid_config() {
    let config = SearchConfig { ingest_concurrency: 0, ..SearchConfig::default() };
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbeddingProvider::default());
    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());

    let pipeline = IngestionPipeline::new(config.clone(), provider.clone(), store.clone());
    assert!(matches!(pipeline, Err(SearchError::ConfigError(_))));

    let config = SearchConfig { default_result_limit: 0, ..SearchConfig::default() };
    let planner = QueryPlanner::new(config, provider, store);
    assert!(matches!(planner, Err(SearchError::ConfigError(_))));
}

#[test]
fn builder_requires_a_store() {
    let err = MedicalSearch::builder().build().err().unwrap();
    assert!(matches!(err, SearchError::ConfigError(_)));

    let err = MedicalSearch::builder()
        .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
        .build()
        .err()
        .unwrap();
    assert!(err.to_string().contains("vector_store"));
}
