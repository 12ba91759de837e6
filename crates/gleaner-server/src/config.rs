//! Configuration file parsing for the server.
//!
//! One TOML file carries the listener settings at the top level and a
//! section per component: `[llm]`, `[extractor]` and `[pipeline]`. Every
//! key has a default, so an empty file is a valid configuration.

use gleaner_extractor::ExtractorConfig;
use gleaner_llm::LlmConfig;
use gleaner_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range or inconsistent
    #[error("Invalid configuration in [{section}]: {message}")]
    Invalid {
        /// Section holding the bad value
        section: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Full process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port
    pub bind_port: u16,

    /// SQLite database file; `:memory:` keeps everything in RAM
    pub database_path: String,

    /// Default tracing filter, used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Completed background batches kept for polling; oldest are dropped first
    pub completed_batch_limit: usize,

    /// Model provider
    pub llm: LlmConfig,

    /// Extraction limits and keyword heuristic
    pub extractor: ExtractorConfig,

    /// Batch limits
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            database_path: "gleaner.db".to_string(),
            log_filter: "info".to_string(),
            completed_batch_limit: crate::registry::DEFAULT_COMPLETED_LIMIT,
            llm: LlmConfig::default(),
            extractor: ExtractorConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                section: "server",
                message: "bind_address must not be empty".to_string(),
            });
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                section: "server",
                message: "database_path must not be empty".to_string(),
            });
        }

        if self.completed_batch_limit == 0 {
            return Err(ConfigError::Invalid {
                section: "server",
                message: "completed_batch_limit must be greater than 0".to_string(),
            });
        }

        self.llm
            .validate()
            .map_err(|message| ConfigError::Invalid { section: "llm", message })?;
        self.extractor
            .validate()
            .map_err(|message| ConfigError::Invalid { section: "extractor", message })?;
        self.pipeline
            .validate()
            .map_err(|message| ConfigError::Invalid { section: "pipeline", message })?;

        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gleaner_llm::ProviderKind;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.database_path, "gleaner.db");
        assert_eq!(config.llm.provider, ProviderKind::Mock);
        assert_eq!(config.pipeline.max_concurrency, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/gleaner/analyses.db"

            [llm]
            provider = "ollama"
            model = "llama3"

            [extractor]
            extraction_timeout_secs = 10

            [extractor.keywords]
            top_k = 5

            [pipeline]
            max_concurrency = 2
            batch_timeout_secs = 300
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.extractor.extraction_timeout_secs, 10);
        assert_eq!(config.extractor.keywords.top_k, 5);
        assert_eq!(config.extractor.keywords.min_length, 3);
        assert_eq!(config.pipeline.max_concurrency, 2);
        assert_eq!(config.pipeline.batch_timeout_secs, Some(300));
        assert_eq!(config.pipeline.max_batch_size, 100);
    }

    #[test]
    fn test_invalid_section_is_named() {
        let err = ServerConfig::from_toml("[pipeline]\nmax_concurrency = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "pipeline", .. }));
    }

    #[test]
    fn test_azure_without_endpoint_rejected() {
        let err = ServerConfig::from_toml("[llm]\nprovider = \"azure_openai\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "llm", .. }));
    }

    #[test]
    fn test_completed_batch_limit() {
        assert_eq!(ServerConfig::default().completed_batch_limit, 100);
        let config = ServerConfig::from_toml("completed_batch_limit = 5\n").unwrap();
        assert_eq!(config.completed_batch_limit, 5);

        let err = ServerConfig::from_toml("completed_batch_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { section: "server", .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ServerConfig::from_toml("bind_port = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
