//! Gleaner LLM Provider Layer
//!
//! Pluggable LLM provider implementations behind a common async interface.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `AzureOpenAiProvider`: Azure OpenAI chat completions
//! - `LlmClient`: Config-selected dispatch over the above
//!
//! Providers issue exactly one HTTP request per call. Retrying is left to
//! callers, which keeps timeouts predictable for the analysis pipeline.
//!
//! # Examples
//!
//! ```
//! use gleaner_llm::{LlmProvider, MockProvider, Prompt};
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"{"summary": "hi"}"#);
//! let reply = provider
//!     .generate_structured(&Prompt::new("system", "user"))
//!     .await
//!     .unwrap();
//! assert_eq!(reply, r#"{"summary": "hi"}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod azure;
pub mod client;
pub mod ollama;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use azure::AzureOpenAiProvider;
pub use client::{LlmClient, LlmConfig, ProviderKind};
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete within the HTTP client's timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be constructed from its settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else if e.is_decode() {
            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

/// A system + user message pair sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions that frame every request
    pub system: String,

    /// The request itself
    pub user: String,
}

impl Prompt {
    /// Create a prompt from its two parts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Trait for LLM provider operations
pub trait LlmProvider: Send + Sync {
    /// Generate a completion constrained to a JSON object
    fn generate_structured(
        &self,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Name of the model serving requests, for logging
    fn model_name(&self) -> &str;
}

/// Canned reply of a [`MockProvider`]
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Specific replies are selected by the first registered key contained in
/// the user prompt; everything else gets the default response.
///
/// # Examples
///
/// ```
/// use gleaner_llm::{LlmProvider, MockProvider, Prompt};
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "first");
/// provider.add_response("beta", "second");
///
/// let reply = provider.generate_structured(&Prompt::new("", "text: beta")).await;
/// assert_eq!(reply.unwrap(), "second");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    replies: Vec<(String, MockReply)>,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            replies: Vec::new(),
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reply with `response` when the user prompt contains `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        self.replies.push((key.into(), MockReply::Text(response.into())));
    }

    /// Fail with `error` when the user prompt contains `key`
    pub fn add_error(&mut self, key: impl Into<String>, error: LlmError) {
        self.replies.push((key.into(), MockReply::Error(error)));
    }

    /// Sleep before answering, to simulate a slow model
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times the provider was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    async fn generate_structured(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .iter()
            .find(|(key, _)| prompt.user.contains(key.as_str()))
            .map(|(_, reply)| reply);

        match reply {
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Error(err)) => Err(err.clone()),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
