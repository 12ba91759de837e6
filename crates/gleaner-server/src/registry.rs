//! In-memory registry of background batches.
//!
//! Tracks each batch submitted through `POST /batch/analyze` from the moment
//! it is accepted until its run completes. Nothing here survives a restart.
//! Only the most recent completed batches are retained; batches still
//! processing are never evicted.

use chrono::{DateTime, Utc};
use gleaner_pipeline::BatchRun;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Lifecycle of a background batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Items are still being analyzed
    Processing,
    /// Every item has resolved
    Completed,
}

impl BatchStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
        }
    }
}

/// Snapshot of one background batch
#[derive(Debug, Clone)]
pub struct BatchRecord {
    /// Registry key handed back to the client
    pub batch_id: String,

    /// Current lifecycle state
    pub status: BatchStatus,

    /// Number of texts submitted
    pub total: usize,

    /// Number of texts resolved so far
    pub processed: usize,

    /// When the batch was accepted
    pub submitted_at: DateTime<Utc>,

    /// Outcomes, once the batch has completed
    pub run: Option<BatchRun>,
}

/// Completed batches kept by [`BatchRegistry::new`]
pub const DEFAULT_COMPLETED_LIMIT: usize = 100;

/// Registry of background batches keyed by batch id
#[derive(Clone)]
pub struct BatchRegistry {
    batches: Arc<RwLock<HashMap<String, BatchRecord>>>,
    completed_limit: usize,
}

impl BatchRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::with_completed_limit(DEFAULT_COMPLETED_LIMIT)
    }

    /// Create a registry retaining at most `limit` completed batches
    pub fn with_completed_limit(limit: usize) -> Self {
        Self {
            batches: Arc::new(RwLock::new(HashMap::new())),
            completed_limit: limit.max(1),
        }
    }

    /// Register a new batch of `total` texts and return its id
    pub fn register(&self, total: usize) -> String {
        let batch_id = uuid::Uuid::now_v7().to_string();
        let record = BatchRecord {
            batch_id: batch_id.clone(),
            status: BatchStatus::Processing,
            total,
            processed: 0,
            submitted_at: Utc::now(),
            run: None,
        };

        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(batch_id.clone(), record);

        debug!(batch_id = %batch_id, total, "Batch registered");
        batch_id
    }

    /// Count one more resolved item
    pub fn record_progress(&self, batch_id: &str) {
        let mut batches = self.batches.write().unwrap_or_else(PoisonError::into_inner);
        match batches.get_mut(batch_id) {
            Some(record) => record.processed = (record.processed + 1).min(record.total),
            None => warn!(batch_id, "Progress reported for unknown batch"),
        }
    }

    /// Mark a batch completed and attach its outcomes
    pub fn complete(&self, batch_id: &str, run: BatchRun) {
        let mut batches = self.batches.write().unwrap_or_else(PoisonError::into_inner);
        match batches.get_mut(batch_id) {
            Some(record) => {
                record.processed = run.total();
                record.status = BatchStatus::Completed;
                record.run = Some(run);
            }
            None => {
                warn!(batch_id, "Completion reported for unknown batch");
                return;
            }
        }

        evict_completed(&mut batches, self.completed_limit);
    }

    /// Snapshot of a batch
    pub fn get(&self, batch_id: &str) -> Option<BatchRecord> {
        self.batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(batch_id)
            .cloned()
    }

    /// Number of batches tracked
    pub fn len(&self) -> usize {
        self.batches.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no batch has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the oldest completed batches until at most `limit` remain
fn evict_completed(batches: &mut HashMap<String, BatchRecord>, limit: usize) {
    let mut completed: Vec<(DateTime<Utc>, String)> = batches
        .values()
        .filter(|record| record.status == BatchStatus::Completed)
        .map(|record| (record.submitted_at, record.batch_id.clone()))
        .collect();

    if completed.len() <= limit {
        return;
    }

    completed.sort();
    let excess = completed.len() - limit;
    for (_, batch_id) in completed.into_iter().take(excess) {
        batches.remove(&batch_id);
        debug!(batch_id = %batch_id, "Evicted completed batch");
    }
}
