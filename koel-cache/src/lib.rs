//! Redis-backed job progress tracking, retry accounting, and cache
//! invalidation for the scraping orchestrator. Storage of the exchange
//! rates themselves lives in `koel-storage`; this crate only ever holds
//! ephemeral, TTL-bound bookkeeping.

pub mod error;
pub mod invalidate;
pub mod progress;

pub use error::CacheError;
pub use invalidate::{invalidate_all, invalidate_pattern, INVALIDATION_PATTERNS};
pub use progress::{JobRecord, JobStatus, ProgressTracker, DEFAULT_JOB_TTL_SECS};
