//! Azure OpenAI Provider Implementation
//!
//! Talks to an Azure OpenAI chat completions deployment in JSON mode.
//! Requests are deterministic (temperature 0) and bounded by `max_tokens`.

use crate::{LlmError, LlmProvider, Prompt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API version query parameter
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Default response length cap
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default timeout for a single HTTP request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Azure OpenAI chat completions provider
#[derive(Debug, Clone)]
pub struct AzureOpenAiProvider {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl AzureOpenAiProvider {
    /// Create a provider for one deployment
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Resource endpoint (e.g., "https://my-resource.openai.azure.com")
    /// - `deployment`: Deployment name of the chat model
    /// - `api_key`: Key sent in the `api-key` header
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(LlmError::Config("Azure OpenAI endpoint is empty".to_string()));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: api_key.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Override the `api-version` query parameter
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the response length cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Give up on a request after `timeout`
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

impl LlmProvider for AzureOpenAiProvider {
    async fn generate_structured(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(deployment = %self.deployment, "Sending chat completion request");

        let response = self
            .client
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.deployment.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(LlmError::from_transport)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no message content".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_layout() {
        let provider =
            AzureOpenAiProvider::new("https://example.openai.azure.com/", "gpt-4o", "key").unwrap();
        assert_eq!(
            provider.url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions"
        );
        assert_eq!(provider.api_version, DEFAULT_API_VERSION);
        assert_eq!(provider.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let result = AzureOpenAiProvider::new("  ", "gpt-4o", "key");
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "hello" },
            ],
            max_tokens: 10,
            temperature: 0.0,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["response_format"]["type"], "json_object");
    }
}
