//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Analysis, AnalysisId, ExtractionError, StructuredResult};
use std::future::Future;

/// Default page size for searches
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Upper bound on the page size of a single search
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Trait for storing and retrieving analyses
///
/// Implemented by the infrastructure layer (gleaner-store). Analyses are
/// append-only: there is no update or delete.
pub trait AnalysisStore {
    /// Error type for store operations
    type Error;

    /// Persist an analysis. Saving the same analysis twice is a no-op.
    fn save(&mut self, analysis: &Analysis) -> Result<AnalysisId, Self::Error>;

    /// Get an analysis by ID
    fn get(&self, id: AnalysisId) -> Result<Option<Analysis>, Self::Error>;

    /// Page of analyses matching the query, newest first
    fn search(&self, query: &AnalysisQuery) -> Result<Vec<Analysis>, Self::Error>;

    /// Number of analyses matching the query, ignoring pagination
    fn count(&self, query: &AnalysisQuery) -> Result<usize, Self::Error>;
}

/// Query criteria for searching analyses
///
/// Filters match case-insensitively as substrings of any topic / keyword.
/// When both are set, both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisQuery {
    /// Filter by topic
    pub topic: Option<String>,

    /// Filter by keyword
    pub keyword: Option<String>,

    /// Maximum results to return (defaults to 10, capped at 100)
    pub limit: Option<usize>,

    /// Number of results to skip
    pub offset: usize,
}

impl AnalysisQuery {
    /// Query matching every analysis
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to analyses with a matching topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Restrict to analyses with a matching keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Set the page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page offset
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Topic filter, or `None` when unset or blank
    pub fn topic_filter(&self) -> Option<&str> {
        non_blank(self.topic.as_deref())
    }

    /// Keyword filter, or `None` when unset or blank
    pub fn keyword_filter(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }

    /// Page size after applying the default and the cap
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trait for turning text into structured knowledge
///
/// Implemented by the application layer (gleaner-extractor). Implementations
/// make at most one remote call per invocation and never persist anything.
pub trait KnowledgeExtractor: Send + Sync {
    /// Extract summary, title, topics, sentiment and keywords from text
    fn extract_structured(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<StructuredResult, ExtractionError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_defaults() {
        assert_eq!(AnalysisQuery::new().effective_limit(), DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_effective_limit_is_capped() {
        assert_eq!(AnalysisQuery::new().with_limit(500).effective_limit(), MAX_SEARCH_LIMIT);
        assert_eq!(AnalysisQuery::new().with_limit(0).effective_limit(), 1);
        assert_eq!(AnalysisQuery::new().with_limit(25).effective_limit(), 25);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = AnalysisQuery::new().with_topic("  ").with_keyword("");
        assert_eq!(query.topic_filter(), None);
        assert_eq!(query.keyword_filter(), None);

        let query = AnalysisQuery::new().with_topic(" Technology ");
        assert_eq!(query.topic_filter(), Some("Technology"));
    }
}
