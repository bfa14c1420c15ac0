//! Human-readable search reports.
//!
//! The rendered layout is the fixed plain-text form below:
//!
//! ```text
//! Search Results:
//!
//! Result 1:
//! Title: ...
//! Journal: ...
//! DOI: ...
//! Keywords: ...
//! Abstract: <first 300 characters>...
//!
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::document::{META_DOI, META_JOURNAL, META_KEYWORDS, META_TITLE, SearchHit};

/// Marker appended to snippets.
pub const ELLIPSIS: &str = "...";

/// Cut `text` to at most `max_chars` characters, never splitting a code point.
pub fn snippet(text: &str, max_chars: usize, always_ellipsis: bool) -> String {
    let cut = text.char_indices().nth(max_chars).map(|(i, _)| i);
    match cut {
        Some(end) => format!("{}{ELLIPSIS}", &text[..end]),
        None if always_ellipsis => format!("{text}{ELLIPSIS}"),
        None => text.to_string(),
    }
}

/// One formatted result block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// 1-based position in the result list.
    pub position: usize,
    /// Record id in the store.
    pub id: String,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Paper title.
    pub title: String,
    /// Journal name.
    pub journal: String,
    /// DOI.
    pub doi: String,
    /// Comma-joined keywords as stored.
    pub keywords: String,
    /// Truncated document text including the ellipsis marker.
    #[serde(rename = "abstract")]
    pub abstract_snippet: String,
}

/// An ordered list of result blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchReport {
    /// Result blocks, most similar first.
    pub entries: Vec<ReportEntry>,
}

impl SearchReport {
    /// Format store hits into report entries.
    pub fn from_hits(hits: &[SearchHit], snippet_chars: usize, always_ellipsis: bool) -> Self {
        let entries = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                let record = &hit.record;
                ReportEntry {
                    position: i + 1,
                    id: record.id.clone(),
                    score: hit.score,
                    title: record.field(META_TITLE).to_string(),
                    journal: record.field(META_JOURNAL).to_string(),
                    doi: record.field(META_DOI).to_string(),
                    keywords: record.field(META_KEYWORDS).to_string(),
                    abstract_snippet: snippet(&record.text, snippet_chars, always_ellipsis),
                }
            })
            .collect();
        Self { entries }
    }

    /// Number of result blocks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no result blocks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Search Results:\n\n")?;
        for entry in &self.entries {
            writeln!(f, "Result {}:", entry.position)?;
            writeln!(f, "Title: {}", entry.title)?;
            writeln!(f, "Journal: {}", entry.journal)?;
            writeln!(f, "DOI: {}", entry.doi)?;
            writeln!(f, "Keywords: {}", entry.keywords)?;
            writeln!(f, "Abstract: {}\n", entry.abstract_snippet)?;
        }
        Ok(())
    }
}

/// Timing for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchStats {
    /// Wall-clock time from embedding the query to formatting the report.
    pub elapsed: Duration,
    /// Number of result blocks returned.
    pub result_count: usize,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Search completed in {:.2} seconds", self.elapsed.as_secs_f64())
    }
}
