//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::parser::parse_llm_response;
use crate::prompt::PromptBuilder;
use gleaner_domain::traits::KnowledgeExtractor;
use gleaner_domain::{ExtractionError, StructuredResult};
use gleaner_llm::{LlmError, LlmProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// Knowledge extraction client backed by an LLM provider
///
/// Makes exactly one provider call per text, bounded by the configured
/// extraction timeout, and classifies every failure into one of the three
/// [`ExtractionError`] kinds.
pub struct LlmExtractor<L> {
    llm_provider: Arc<L>,
    extraction_timeout: Duration,
}

impl<L> Clone for LlmExtractor<L> {
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            extraction_timeout: self.extraction_timeout,
        }
    }
}

impl<L: LlmProvider> LlmExtractor<L> {
    /// Create a new extractor
    pub fn new(llm_provider: L, config: &ExtractorConfig) -> Self {
        Self {
            llm_provider: Arc::new(llm_provider),
            extraction_timeout: config.extraction_timeout(),
        }
    }

    /// Override the per-call time budget
    pub fn with_timeout(mut self, extraction_timeout: Duration) -> Self {
        self.extraction_timeout = extraction_timeout;
        self
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.llm_provider
    }
}

fn classify_llm_error(err: LlmError) -> ExtractionError {
    match err {
        LlmError::Timeout(msg) => ExtractionError::Timeout(msg),
        LlmError::InvalidResponse(msg) => ExtractionError::MalformedResponse(msg),
        other => ExtractionError::RemoteError(other.to_string()),
    }
}

impl<L: LlmProvider> KnowledgeExtractor for LlmExtractor<L> {
    async fn extract_structured(&self, text: &str) -> Result<StructuredResult, ExtractionError> {
        let prompt = PromptBuilder::new(text).build();

        debug!(
            model = self.llm_provider.model_name(),
            "Prompt length: {} chars",
            prompt.user.len()
        );

        let reply = timeout(
            self.extraction_timeout,
            self.llm_provider.generate_structured(&prompt),
        )
        .await
        .map_err(|_| {
            ExtractionError::Timeout(format!(
                "no reply within {}s",
                self.extraction_timeout.as_secs_f64()
            ))
        })?
        .map_err(classify_llm_error)?;

        debug!("LLM response length: {} chars", reply.len());

        let result =
            parse_llm_response(&reply).map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        info!(
            topics = result.topics.len(),
            keywords = result.keywords.len(),
            sentiment = %result.sentiment,
            "Extraction complete"
        );

        Ok(result)
    }
}
