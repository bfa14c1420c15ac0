//! Output formatting for ingestion and search results.

use medlit_rag::{IngestReport, SearchOutcome};
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Serialize)]
struct JsonIngest<'a> {
    documents_processed: usize,
    ingestion_seconds: f64,
    ids: &'a [String],
}

#[derive(Serialize)]
struct JsonSearch<'a> {
    query: &'a str,
    #[serde(flatten)]
    outcome: &'a SearchOutcome,
    stats_line: String,
}

pub fn format_ingest(report: &IngestReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "Processed {} documents in {:.2} seconds",
            report.documents_processed,
            report.elapsed.as_secs_f64()
        ),
        OutputFormat::Json => to_json(&JsonIngest {
            documents_processed: report.documents_processed,
            ingestion_seconds: report.elapsed.as_secs_f64(),
            ids: &report.ids,
        }),
    }
}

pub fn format_search(query: &str, outcome: &SearchOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}{}", outcome.report, outcome.stats),
        OutputFormat::Json => {
            to_json(&JsonSearch { query, outcome, stats_line: outcome.stats.to_string() })
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
