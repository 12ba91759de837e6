//! Batch orchestration: many texts through the analysis service concurrently

use crate::config::PipelineConfig;
use crate::error::AnalysisError;
use crate::service::AnalysisService;
use gleaner_domain::traits::{AnalysisStore, KnowledgeExtractor};
use gleaner_domain::Analysis;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

/// Reason given to items still unresolved when the batch deadline passes
pub const BATCH_TIMED_OUT: &str = "batch timed out";

/// What happened to one text of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// A record was produced and stored (it may still be `failed`)
    Analyzed(Analysis),

    /// No record was produced
    Rejected {
        /// Why the text was not analyzed
        reason: String,
    },
}

/// One slot of a batch, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Input text
    pub text: String,

    /// Outcome for this text
    pub outcome: BatchOutcome,
}

impl BatchItem {
    /// The stored analysis, if one was produced
    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.outcome {
            BatchOutcome::Analyzed(analysis) => Some(analysis),
            BatchOutcome::Rejected { .. } => None,
        }
    }

    /// Whether this item ended with a completed analysis
    pub fn is_success(&self) -> bool {
        self.analysis().is_some_and(Analysis::is_completed)
    }
}

/// Results of one batch, ordered like the submitted texts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRun {
    /// Per-text outcomes
    pub items: Vec<BatchItem>,
}

impl BatchRun {
    /// Number of texts submitted
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Items that produced a completed analysis
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    /// Items that produced a failed analysis or no analysis at all
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// Fans a batch of texts out to the analysis service
///
/// At most `max_concurrency` analyses run at once across every batch of this
/// orchestrator and its clones. One item failing never affects its siblings,
/// and nothing is retried.
pub struct BatchOrchestrator<E, S> {
    service: Arc<AnalysisService<E, S>>,
    config: PipelineConfig,
    permits: Arc<Semaphore>,
}

impl<E, S> Clone for BatchOrchestrator<E, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: self.config.clone(),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<E, S> BatchOrchestrator<E, S>
where
    E: KnowledgeExtractor + 'static,
    S: AnalysisStore + Send + 'static,
    S::Error: Display,
{
    /// Create a new orchestrator sharing `service`
    pub fn new(service: Arc<AnalysisService<E, S>>, config: PipelineConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            service,
            config,
            permits,
        }
    }

    /// The shared analysis service
    pub fn service(&self) -> &Arc<AnalysisService<E, S>> {
        &self.service
    }

    /// Batch limits in effect
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reject batches that are empty or larger than `max_batch_size`
    pub fn check_batch(&self, texts: &[String]) -> Result<(), AnalysisError> {
        if texts.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "batch must contain at least one text".to_string(),
            ));
        }
        if texts.len() > self.config.max_batch_size {
            return Err(AnalysisError::InvalidInput(format!(
                "batch has {} texts, maximum is {}",
                texts.len(),
                self.config.max_batch_size
            )));
        }
        Ok(())
    }

    /// Analyze every text and return the outcomes in input order
    pub async fn analyze_batch(&self, texts: Vec<String>) -> BatchRun {
        self.analyze_batch_observed(texts, |_, _| {}).await
    }

    /// Like [`analyze_batch`](Self::analyze_batch), reporting each item as it resolves
    ///
    /// `on_item` receives the input index and the resolved item, in
    /// completion order rather than input order.
    pub async fn analyze_batch_observed<F>(&self, texts: Vec<String>, mut on_item: F) -> BatchRun
    where
        F: FnMut(usize, &BatchItem),
    {
        let total = texts.len();
        info!(
            total,
            available = self.permits.available_permits(),
            "Starting batch"
        );

        let mut join_set = JoinSet::new();

        for (idx, text) in texts.iter().enumerate() {
            let service = Arc::clone(&self.service);
            let permits = Arc::clone(&self.permits);
            let text = text.clone();

            join_set.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => match service.analyze(&text).await {
                        Ok(analysis) => BatchOutcome::Analyzed(analysis),
                        Err(e) => BatchOutcome::Rejected {
                            reason: e.to_string(),
                        },
                    },
                    Err(_) => BatchOutcome::Rejected {
                        reason: "worker pool closed".to_string(),
                    },
                };
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<BatchItem>> = (0..total).map(|_| None).collect();
        let deadline = self.config.batch_timeout().map(|t| Instant::now() + t);
        let mut timed_out = false;

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, join_set.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            unresolved = join_set.len(),
                            "Batch deadline passed, aborting remaining items"
                        );
                        join_set.abort_all();
                        timed_out = true;
                        break;
                    }
                },
                None => join_set.join_next().await,
            };

            let Some(joined) = next else {
                break;
            };

            match joined {
                Ok((idx, outcome)) => {
                    let item = BatchItem {
                        text: texts[idx].clone(),
                        outcome,
                    };
                    on_item(idx, &item);
                    slots[idx] = Some(item);
                }
                Err(e) => error!("Batch worker task failed: {}", e),
            }
        }

        let unresolved_reason = if timed_out {
            BATCH_TIMED_OUT
        } else {
            "worker task ended without a result"
        };

        let mut items = Vec::with_capacity(total);
        for (idx, (slot, text)) in slots.into_iter().zip(texts).enumerate() {
            let item = match slot {
                Some(item) => item,
                None => {
                    let item = BatchItem {
                        text,
                        outcome: BatchOutcome::Rejected {
                            reason: unresolved_reason.to_string(),
                        },
                    };
                    on_item(idx, &item);
                    item
                }
            };
            items.push(item);
        }

        let run = BatchRun { items };
        info!(
            total = run.total(),
            succeeded = run.succeeded(),
            failed = run.failed(),
            "Batch complete"
        );
        run
    }
}
