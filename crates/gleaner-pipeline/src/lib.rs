//! Gleaner Analysis Pipeline
//!
//! Turns raw text into stored analyses, one at a time or in concurrent
//! batches.
//!
//! # Architecture
//!
//! ```text
//! text ─→ AnalysisService ─→ KnowledgeExtractor ─┬─ ok ──→ completed record
//!                 │                              └─ err ─→ failed record + heuristic keywords
//!                 └─→ AnalysisStore (every record is persisted)
//!
//! texts ─→ BatchOrchestrator ─→ N × AnalysisService (bounded by a semaphore)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use gleaner_extractor::{ExtractorConfig, LlmExtractor};
//! use gleaner_llm::MockProvider;
//! use gleaner_pipeline::{AnalysisService, BatchOrchestrator, PipelineConfig};
//! use gleaner_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let extractor = LlmExtractor::new(MockProvider::default(), &config);
//! let store = SqliteStore::new(":memory:")?;
//! let service = Arc::new(AnalysisService::new(extractor, store, &config));
//!
//! let analysis = service.analyze("Rust makes systems programming safer.").await?;
//! println!("{}: {}", analysis.status, analysis.summary);
//!
//! let orchestrator = BatchOrchestrator::new(service, PipelineConfig::default());
//! let run = orchestrator
//!     .analyze_batch(vec!["first text".into(), "second text".into()])
//!     .await;
//! println!("{} of {} succeeded", run.succeeded(), run.total());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod batch;
mod config;
mod error;
mod service;

pub use batch::{BatchItem, BatchOrchestrator, BatchOutcome, BatchRun, BATCH_TIMED_OUT};
pub use config::PipelineConfig;
pub use error::AnalysisError;
pub use service::{confidence_score, AnalysisService, SearchPage, NO_USABLE_CONTENT};
