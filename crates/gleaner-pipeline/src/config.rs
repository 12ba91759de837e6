//! Configuration for batch processing

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the batch orchestrator
///
/// # Examples
///
/// ```
/// use gleaner_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.max_concurrency, 5);
/// assert!(config.batch_timeout().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum analyses in flight at once within one batch
    pub max_concurrency: usize,

    /// Overall time budget of one batch (seconds); unset means unbounded
    pub batch_timeout_secs: Option<u64>,

    /// Largest batch accepted
    pub max_batch_size: usize,
}

impl PipelineConfig {
    /// Get the batch timeout as a Duration
    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".to_string());
        }
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than 0".to_string());
        }
        if self.batch_timeout_secs == Some(0) {
            return Err("batch_timeout_secs must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            batch_timeout_secs: None,
            max_batch_size: 100,
        }
    }
}
