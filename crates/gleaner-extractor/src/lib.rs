//! Gleaner Extractor
//!
//! Turns free-form text into structured knowledge using an LLM, plus the
//! heuristic keyword extractor used when the model cannot help.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → LlmProvider → parser → StructuredResult
//!   └──→ KeywordExtractor → ranked keywords (fallback)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use gleaner_domain::traits::KnowledgeExtractor;
//! use gleaner_extractor::{ExtractorConfig, LlmExtractor};
//! use gleaner_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"summary": "Alice works at Acme.", "topics": ["work"]}"#);
//! let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());
//!
//! let result = extractor.extract_structured("Alice works at Acme Corp.").await?;
//! println!("Summary: {}", result.summary);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod keywords;
mod parser;
mod prompt;

#[cfg(test)]
mod tests;

pub use config::{ExtractorConfig, KeywordConfig};
pub use error::ExtractorError;
pub use extractor::LlmExtractor;
pub use keywords::{KeywordExtractor, DEFAULT_STOP_WORDS};
pub use parser::parse_llm_response;
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
