//! Analysis module - the unit of knowledge Gleaner extracts from text

use crate::Sentiment;
use std::fmt;

/// Unique identifier for an analysis based on UUIDv7
///
/// UUIDv7 carries a millisecond timestamp in its top 48 bits, so ids sort
/// in creation order. The store uses this as the tie-breaker when two
/// analyses share the same `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisId(u128);

impl AnalysisId {
    /// Generate a new UUIDv7-based AnalysisId
    ///
    /// # Examples
    ///
    /// ```
    /// use gleaner_domain::AnalysisId;
    ///
    /// let id = AnalysisId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an AnalysisId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an AnalysisId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use gleaner_domain::AnalysisId;
    ///
    /// let id = AnalysisId::new();
    /// let parsed = AnalysisId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid analysis id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since Unix epoch encoded in the UUIDv7
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStatus {
    /// The model produced usable content (summary or keywords)
    Completed,

    /// Extraction produced nothing usable; only fallback keywords remain
    Failed,
}

impl AnalysisStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Failed => "failed",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "completed" => Some(AnalysisStatus::Completed),
            "failed" => Some(AnalysisStatus::Failed),
            _ => None,
        }
    }
}

impl std::str::FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid analysis status: {}", s))
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of extracted knowledge
///
/// Analyses are created once, at the end of an extraction attempt, and are
/// never mutated afterwards. A failed analysis is still a full record: it
/// keeps the original text, heuristic keywords and the reason extraction
/// failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Unique identifier
    pub id: AnalysisId,

    /// The submitted text (never empty)
    pub original_text: String,

    /// Short summary from the model; empty when extraction failed
    pub summary: String,

    /// Descriptive title, when the model could produce one
    pub title: Option<String>,

    /// Topics discussed in the text
    pub topics: Vec<String>,

    /// Overall tone
    pub sentiment: Sentiment,

    /// Keywords ranked by importance (model) or frequency (heuristic)
    pub keywords: Vec<String>,

    /// Rough quality score in [0.0, 1.0]
    pub confidence_score: f64,

    /// Whether extraction produced usable content
    pub status: AnalysisStatus,

    /// Why extraction failed; set only for failed analyses
    pub failure_reason: Option<String>,

    /// Creation time in milliseconds since Unix epoch
    pub created_at: u64,
}

impl Analysis {
    /// True when the analysis carries usable model output
    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }

    /// True when the analysis only carries fallback output
    pub fn is_failed(&self) -> bool {
        self.status == AnalysisStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: AnalysisStatus) -> Analysis {
        Analysis {
            id: AnalysisId::new(),
            original_text: "Rust makes systems programming safer.".to_string(),
            summary: String::new(),
            title: None,
            topics: Vec::new(),
            sentiment: Sentiment::Unknown,
            keywords: vec!["rust".to_string()],
            confidence_score: 0.35,
            status,
            failure_reason: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_analysis_id_ordering() {
        let id1 = AnalysisId::from_value(1000);
        let id2 = AnalysisId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_analysis_id_chronological() {
        let id1 = AnalysisId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = AnalysisId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_analysis_id_display_and_parse() {
        let id = AnalysisId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);
        assert_eq!(AnalysisId::from_string(&id_str).unwrap(), id);
    }

    #[test]
    fn test_analysis_id_invalid_string() {
        assert!(AnalysisId::from_string("not-a-valid-uuid").is_err());
        assert!(AnalysisId::from_string("").is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(AnalysisStatus::parse("completed"), Some(AnalysisStatus::Completed));
        assert_eq!(AnalysisStatus::parse("FAILED"), Some(AnalysisStatus::Failed));
        assert_eq!(AnalysisStatus::parse("pending"), None);
        assert!("bogus".parse::<AnalysisStatus>().is_err());
    }

    #[test]
    fn test_status_helpers() {
        assert!(sample(AnalysisStatus::Completed).is_completed());
        assert!(!sample(AnalysisStatus::Completed).is_failed());
        assert!(sample(AnalysisStatus::Failed).is_failed());
    }
}
