//! Analysis service: one text in, one persisted analysis out

use crate::error::AnalysisError;
use gleaner_domain::traits::{AnalysisQuery, AnalysisStore, KnowledgeExtractor};
use gleaner_domain::{
    Analysis, AnalysisId, AnalysisStatus, ExtractionError, Sentiment, StructuredResult,
};
use gleaner_extractor::{ExtractorConfig, KeywordExtractor};
use std::fmt::Display;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Failure reason recorded when the model answered but said nothing useful
pub const NO_USABLE_CONTENT: &str = "model returned no usable content";

/// One page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Matching analyses, newest first
    pub analyses: Vec<Analysis>,

    /// Number of matches ignoring pagination
    pub total: usize,
}

/// Orchestrates extraction, keyword fallback and persistence for one text
///
/// Every call to [`analyze`](Self::analyze) with acceptable input produces
/// and stores a record, even when the model is unreachable: extraction
/// failures become `failed` records carrying heuristic keywords.
pub struct AnalysisService<E, S> {
    extractor: E,
    store: Mutex<S>,
    keywords: KeywordExtractor,
    max_text_length: usize,
}

impl<E, S> AnalysisService<E, S>
where
    E: KnowledgeExtractor,
    S: AnalysisStore + Send,
    S::Error: Display,
{
    /// Create a new service
    pub fn new(extractor: E, store: S, config: &ExtractorConfig) -> Self {
        Self {
            extractor,
            store: Mutex::new(store),
            keywords: KeywordExtractor::new(&config.keywords),
            max_text_length: config.max_text_length,
        }
    }

    /// Analyze one text and persist the outcome
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for empty, whitespace-only or oversized text (nothing is stored)
    /// - `Store` when the record could not be persisted
    pub async fn analyze(&self, text: &str) -> Result<Analysis, AnalysisError> {
        self.check_input(text)?;

        let id = AnalysisId::new();
        info!(analysis_id = %id, "Analyzing text of {} chars", text.chars().count());

        let analysis = match self.extractor.extract_structured(text).await {
            Ok(result) => self.from_extraction(id, text, result),
            Err(err) => self.fallback(id, text, &err),
        };

        self.persist(&analysis)?;

        debug!(
            analysis_id = %analysis.id,
            status = %analysis.status,
            confidence = analysis.confidence_score,
            "Analysis stored"
        );

        Ok(analysis)
    }

    /// Get a stored analysis
    pub fn get(&self, id: AnalysisId) -> Result<Analysis, AnalysisError> {
        let store = self.lock_store()?;
        store
            .get(id)
            .map_err(|e| AnalysisError::Store(e.to_string()))?
            .ok_or_else(|| AnalysisError::NotFound(id.to_string()))
    }

    /// Search stored analyses
    pub fn search(&self, query: &AnalysisQuery) -> Result<SearchPage, AnalysisError> {
        let store = self.lock_store()?;
        let analyses = store
            .search(query)
            .map_err(|e| AnalysisError::Store(e.to_string()))?;
        let total = store
            .count(query)
            .map_err(|e| AnalysisError::Store(e.to_string()))?;

        Ok(SearchPage { analyses, total })
    }

    /// Heuristic keywords for a text, as used by the fallback path
    pub fn heuristic_keywords(&self, text: &str) -> Vec<String> {
        self.keywords.keywords(text)
    }

    fn check_input(&self, text: &str) -> Result<(), AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(AnalysisError::InvalidInput(format!(
                "text is {} characters, maximum is {}",
                length, self.max_text_length
            )));
        }

        Ok(())
    }

    fn from_extraction(&self, id: AnalysisId, text: &str, result: StructuredResult) -> Analysis {
        let StructuredResult {
            summary,
            title,
            topics,
            sentiment,
            keywords,
        } = result;

        let keywords = if keywords.is_empty() {
            debug!(analysis_id = %id, "Model returned no keywords, using heuristic");
            self.keywords.keywords(text)
        } else {
            keywords
        };

        let (status, failure_reason) = if summary.trim().is_empty() && keywords.is_empty() {
            warn!(analysis_id = %id, "{}", NO_USABLE_CONTENT);
            (AnalysisStatus::Failed, Some(NO_USABLE_CONTENT.to_string()))
        } else {
            (AnalysisStatus::Completed, None)
        };

        Analysis {
            id,
            original_text: text.to_string(),
            confidence_score: confidence_score(text, &summary, &topics, &keywords),
            summary,
            title,
            topics,
            sentiment,
            keywords,
            status,
            failure_reason,
            created_at: id.timestamp(),
        }
    }

    fn fallback(&self, id: AnalysisId, text: &str, err: &ExtractionError) -> Analysis {
        warn!(
            analysis_id = %id,
            kind = err.kind(),
            "Extraction failed, falling back to heuristic keywords: {}",
            err.detail()
        );

        let keywords = self.keywords.keywords(text);

        Analysis {
            id,
            original_text: text.to_string(),
            summary: String::new(),
            title: None,
            topics: Vec::new(),
            sentiment: Sentiment::Unknown,
            confidence_score: confidence_score(text, "", &[], &keywords),
            keywords,
            status: AnalysisStatus::Failed,
            failure_reason: Some(err.to_string()),
            created_at: id.timestamp(),
        }
    }

    fn persist(&self, analysis: &Analysis) -> Result<(), AnalysisError> {
        let mut store = self.lock_store()?;
        store
            .save(analysis)
            .map_err(|e| AnalysisError::Store(e.to_string()))?;
        Ok(())
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, S>, AnalysisError> {
        self.store
            .lock()
            .map_err(|_| AnalysisError::Store("store lock poisoned".to_string()))
    }
}

/// Rough completeness score in [0, 1], rounded to two decimals
///
/// Four equally weighted checks: input length, a non-trivial summary, at
/// least one topic, at least one keyword. Short inputs get partial credit.
pub fn confidence_score(text: &str, summary: &str, topics: &[String], keywords: &[String]) -> f64 {
    let length = text.chars().count();
    let mut score: f64 = if length > 100 {
        0.25
    } else if length > 50 {
        0.15
    } else {
        0.10
    };

    if summary.trim().chars().count() > 10 {
        score += 0.25;
    }
    if !topics.is_empty() {
        score += 0.25;
    }
    if !keywords.is_empty() {
        score += 0.25;
    }

    (score.min(1.0) * 100.0).round() / 100.0
}
