//! Error types for the analysis pipeline

use thiserror::Error;

/// Errors surfaced by the analysis pipeline
///
/// Extraction failures never appear here: they are folded into a failed
/// analysis record instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Text was empty, whitespace-only or too long; no record was created
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No analysis with the requested id
    #[error("Analysis not found: {0}")]
    NotFound(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),
}
