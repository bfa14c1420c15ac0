//! Structured search filters.
//!
//! A [`FilterSpec`] carries the optional publication-year, journal and
//! keyword constraints plus the result count. Each non-empty constraint
//! becomes a [`FieldPredicate`]: a case-sensitive substring test against one
//! metadata field. Whether predicates restrict results is decided by
//! [`FilterMode`].

use serde::{Deserialize, Serialize};

use crate::document::{IndexedRecord, META_JOURNAL, META_KEYWORDS, META_PUBLICATION_DATE};
use crate::error::{Result, SearchError};

/// Smallest accepted result count.
pub const MIN_RESULT_LIMIT: usize = 1;
/// Largest accepted result count.
pub const MAX_RESULT_LIMIT: usize = 20;

/// Whether structured filters restrict search results.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Predicates are built and logged, but the search runs unfiltered.
    /// This is the default.
    #[default]
    Ignore,
    /// Neighbours are fetched, then records failing any predicate are dropped.
    PostRetrieval,
}

/// A substring-containment test on one metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPredicate {
    /// Metadata key the predicate reads.
    pub field: &'static str,
    /// Text that must appear in the field.
    pub needle: String,
}

impl FieldPredicate {
    /// Whether the record's field contains the needle.
    pub fn matches(&self, record: &IndexedRecord) -> bool {
        record.field(self.field).contains(&self.needle)
    }
}

/// Per-query filter values and result bound.
///
/// Only constructible through [`FilterSpec::new`], so the limit is always in range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    publication_year: Option<String>,
    journal: Option<String>,
    keywords: Option<String>,
    limit: usize,
}

impl FilterSpec {
    /// Create a spec with no constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilterInput`] if `limit` is outside
    /// `1..=20`.
    pub fn new(limit: usize) -> Result<Self> {
        if !(MIN_RESULT_LIMIT..=MAX_RESULT_LIMIT).contains(&limit) {
            return Err(SearchError::InvalidFilterInput(format!(
                "limit ({limit}) must be between {MIN_RESULT_LIMIT} and {MAX_RESULT_LIMIT}"
            )));
        }
        Ok(Self { publication_year: None, journal: None, keywords: None, limit })
    }

    /// Constrain the publication date. Blank input clears the constraint.
    pub fn with_publication_year(mut self, year: impl Into<String>) -> Self {
        self.publication_year = non_blank(year.into());
        self
    }

    /// Constrain the journal. Blank input clears the constraint.
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = non_blank(journal.into());
        self
    }

    /// Constrain the keywords. Blank input clears the constraint.
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = non_blank(keywords.into());
        self
    }

    /// Maximum number of results.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The publication-year constraint, if any.
    pub fn publication_year(&self) -> Option<&str> {
        self.publication_year.as_deref()
    }

    /// The journal constraint, if any.
    pub fn journal(&self) -> Option<&str> {
        self.journal.as_deref()
    }

    /// The keywords constraint, if any.
    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    /// One predicate per non-empty constraint.
    pub fn predicates(&self) -> Vec<FieldPredicate> {
        [
            (META_PUBLICATION_DATE, &self.publication_year),
            (META_JOURNAL, &self.journal),
            (META_KEYWORDS, &self.keywords),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value.as_ref().map(|needle| FieldPredicate { field, needle: needle.clone() })
        })
        .collect()
    }

    /// Whether every predicate holds for the record.
    pub fn matches(&self, record: &IndexedRecord) -> bool {
        self.predicates().iter().all(|p| p.matches(record))
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
