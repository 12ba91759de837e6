//! Gleaner Domain Layer
//!
//! Core data model and trait seams for Gleaner. This crate only depends on
//! `uuid`; storage, HTTP and model providers live in other crates and plug in
//! through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **Analysis**: one immutable unit of extracted knowledge (summary, topics,
//!   sentiment, keywords) derived from one input text
//! - **Structured Result**: what a model call is expected to produce
//! - **Extraction Error**: the three ways a model call can fail (timeout,
//!   remote error, malformed response)
//! - **Status**: `completed` when usable content was produced, `failed` when
//!   the record only carries fallback keywords and a failure reason

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod extraction;
pub mod sentiment;
pub mod traits;

// Re-exports for convenience
pub use analysis::{Analysis, AnalysisId, AnalysisStatus};
pub use extraction::{ExtractionError, StructuredResult};
pub use sentiment::Sentiment;
pub use traits::{AnalysisQuery, AnalysisStore, KnowledgeExtractor};
