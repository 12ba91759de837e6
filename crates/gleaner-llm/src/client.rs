//! Config-selected provider dispatch
//!
//! `LlmClient` wraps whichever provider the `[llm]` config section names, so
//! the rest of the system can stay generic over a single concrete type.

use crate::{
    azure, ollama, AzureOpenAiProvider, LlmError, LlmProvider, MockProvider, OllamaProvider, Prompt,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reply used by the mock provider when no `mock_response` is configured
pub const DEFAULT_MOCK_RESPONSE: &str = r#"{"summary": "Mock analysis of the submitted text.", "title": "Mock Analysis", "topics": ["general", "testing", "mock"], "sentiment": "neutral", "keywords": ["mock", "analysis", "text"]}"#;

/// Which provider implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Azure OpenAI chat completions
    AzureOpenai,
    /// Local Ollama server
    Ollama,
    /// Canned responses, no network
    #[default]
    Mock,
}

/// LLM provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider implementation
    pub provider: ProviderKind,

    /// Base URL of the provider; Ollama falls back to its local default
    pub endpoint: Option<String>,

    /// Model name (Ollama) or deployment name fallback (Azure)
    pub model: String,

    /// Azure deployment name; defaults to `model`
    pub deployment: Option<String>,

    /// Azure `api-version` query parameter
    pub api_version: String,

    /// API key given inline
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,

    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,

    /// Response length cap
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Fixed reply of the mock provider
    pub mock_response: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            endpoint: None,
            model: "gpt-4o".to_string(),
            deployment: None,
            api_version: azure::DEFAULT_API_VERSION.to_string(),
            api_key: None,
            api_key_env: "GLEANER_LLM_API_KEY".to_string(),
            request_timeout_secs: azure::DEFAULT_TIMEOUT_SECS,
            max_tokens: azure::DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            mock_response: None,
        }
    }
}

impl LlmConfig {
    /// Config for an Azure OpenAI deployment
    pub fn azure_openai(endpoint: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::AzureOpenai,
            endpoint: Some(endpoint.into()),
            deployment: Some(deployment.into()),
            ..Self::default()
        }
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.provider == ProviderKind::AzureOpenai && self.endpoint.is_none() {
            return Err("endpoint is required for the azure_openai provider".to_string());
        }
        Ok(())
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Any supported provider, chosen at startup
#[derive(Debug, Clone)]
pub enum LlmClient {
    /// Azure OpenAI chat completions
    AzureOpenai(AzureOpenAiProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// Canned responses
    Mock(MockProvider),
}

impl LlmClient {
    /// Build the provider described by `config`
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;

        let client = match config.provider {
            ProviderKind::AzureOpenai => {
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .ok_or_else(|| LlmError::Config("missing endpoint".to_string()))?;
                let api_key = config.resolve_api_key().ok_or_else(|| {
                    LlmError::Config(format!(
                        "no API key configured and {} is not set",
                        config.api_key_env
                    ))
                })?;
                let deployment = config.deployment.as_deref().unwrap_or(&config.model);

                let provider = AzureOpenAiProvider::new(endpoint, deployment, api_key)?
                    .with_api_version(&config.api_version)
                    .with_max_tokens(config.max_tokens)
                    .with_temperature(config.temperature)
                    .with_request_timeout(config.request_timeout())?;
                LlmClient::AzureOpenai(provider)
            }
            ProviderKind::Ollama => {
                let endpoint = config.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT);
                LlmClient::Ollama(OllamaProvider::with_timeout(
                    endpoint,
                    &config.model,
                    config.request_timeout(),
                )?)
            }
            ProviderKind::Mock => LlmClient::Mock(MockProvider::new(
                config.mock_response.as_deref().unwrap_or(DEFAULT_MOCK_RESPONSE),
            )),
        };

        tracing::info!(provider = ?config.provider, model = client.model_name(), "LLM client ready");
        Ok(client)
    }
}

impl From<MockProvider> for LlmClient {
    fn from(provider: MockProvider) -> Self {
        LlmClient::Mock(provider)
    }
}

impl LlmProvider for LlmClient {
    async fn generate_structured(&self, prompt: &Prompt) -> Result<String, LlmError> {
        match self {
            LlmClient::AzureOpenai(p) => p.generate_structured(prompt).await,
            LlmClient::Ollama(p) => p.generate_structured(prompt).await,
            LlmClient::Mock(p) => p.generate_structured(prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            LlmClient::AzureOpenai(p) => p.model_name(),
            LlmClient::Ollama(p) => p.model_name(),
            LlmClient::Mock(p) => p.model_name(),
        }
    }
}
