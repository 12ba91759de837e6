//! Extraction module - what a model call produces, and how it can fail

use crate::Sentiment;
use std::fmt;

/// Structured fields a model call is expected to produce
///
/// Absent and empty keyword lists are both represented as an empty `Vec`;
/// the analysis pipeline treats them the same way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredResult {
    /// Concise summary of the text
    pub summary: String,

    /// Descriptive title, if the model produced one
    pub title: Option<String>,

    /// Key themes of the text
    pub topics: Vec<String>,

    /// Overall tone (`Neutral` when the model omitted it)
    pub sentiment: Sentiment,

    /// Keywords reported by the model, possibly empty
    pub keywords: Vec<String>,
}

/// Ways a knowledge extraction call can fail
///
/// Each kind is reported separately so callers can decide how to degrade.
/// None of them is fatal to the analysis pipeline: all three end up as a
/// failed analysis carrying heuristic keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The remote call exceeded its time budget
    Timeout(String),

    /// The remote service failed or could not be reached
    RemoteError(String),

    /// A response arrived but did not have the expected structure
    MalformedResponse(String),
}

impl ExtractionError {
    /// Short machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Timeout(_) => "timeout",
            ExtractionError::RemoteError(_) => "remote_error",
            ExtractionError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Detail message attached to the failure
    pub fn detail(&self) -> &str {
        match self {
            ExtractionError::Timeout(msg)
            | ExtractionError::RemoteError(msg)
            | ExtractionError::MalformedResponse(msg) => msg,
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.detail())
    }
}

impl std::error::Error for ExtractionError {}
