use thiserror::Error;

use koel_core::{AdapterError, ManagerError};
use koel_cache::CacheError;
use koel_storage::StorageError;

/// Aggregate failure mode for the orchestrator's job-level operations.
///
/// Every lower-layer error is folded in via `#[from]` into a single enum at
/// the outermost boundary rather than a generic `Box<dyn Error>`, so a
/// caller can still match on `ManagerError::AllSourcesFailed` to decide
/// whether a retry is worth scheduling.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("scrape failed: {0}")]
    Manager(#[from] ManagerError),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("cron scheduling failed: {0}")]
    Scheduler(String),
}
