//! Orchestration, scheduling glue, partition maintenance, and critical-error
//! notification for the koel scraping pipeline. The binaries in `src/bin/`
//! are thin wiring over what's exported here: a `koel-worker` binary that
//! registers the cron surface with `tokio-cron-scheduler`, and a
//! `koel-seed` binary that populates the currency catalog.

pub mod error;
pub mod maintenance;
pub mod notify;
pub mod orchestrator;
pub mod retry;

pub use error::OrchestratorError;
pub use orchestrator::{CurrencyGroup, Orchestrator, SweepSummary};
