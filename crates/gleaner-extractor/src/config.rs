//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of the heuristic keyword extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Shortest token kept, in characters
    pub min_length: usize,

    /// Number of keywords returned
    pub top_k: usize,

    /// Replacement stop-word list; `None` uses the built-in list
    pub stop_words: Option<Vec<String>>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            top_k: 10,
            stop_words: None,
        }
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,

    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Heuristic keyword fallback
    pub keywords: KeywordConfig,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.keywords.min_length == 0 {
            return Err("keywords.min_length must be greater than 0".to_string());
        }
        if self.keywords.top_k == 0 {
            return Err("keywords.top_k must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            extraction_timeout_secs: 30,
            max_text_length: 50_000,
            keywords: KeywordConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_max_text_length() {
        let mut config = ExtractorConfig::default();
        config.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ExtractorConfig::default();
        config.extraction_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_top_k() {
        let mut config = ExtractorConfig::default();
        config.keywords.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml(
            r#"
            extraction_timeout_secs = 5

            [keywords]
            top_k = 3
            stop_words = ["alpha"]
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction_timeout_secs, 5);
        assert_eq!(config.max_text_length, 50_000);
        assert_eq!(config.keywords.top_k, 3);
        assert_eq!(config.keywords.min_length, 3);
        assert_eq!(config.keywords.stop_words, Some(vec!["alpha".to_string()]));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert_eq!(ExtractorConfig::from_toml(&toml_str).unwrap(), config);
    }
}
