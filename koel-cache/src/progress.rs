use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Default TTL applied to `job:*`/`retry:*` keys: records are advisory
/// progress state, not an audit log, so they are allowed to expire on their
/// own rather than being explicitly cleaned up mid-job.
pub const DEFAULT_JOB_TTL_SECS: u64 = 300;

/// Atomic read-or-init-then-compare-and-increment script backing
/// [`ProgressTracker::should_retry_currency`]. A plain `INCR` can't express
/// "stop incrementing past max and return false" without a race between two
/// workers retrying the same `(job, code)` concurrently, so the whole
/// decision runs server-side in one round trip.
const SHOULD_RETRY_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
local max = tonumber(ARGV[1])
local ttl = tonumber(ARGV[2])
if current == false then
    redis.call('SET', KEYS[1], '1', 'EX', ttl)
    return 1
end
local count = tonumber(current)
if count < max then
    redis.call('SET', KEYS[1], tostring(count + 1), 'EX', ttl)
    return 1
end
return 0
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// A job's lifecycle record as stored under `job:<job_id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_secs: Option<f64>,
    pub completed_currencies: Vec<String>,
    pub failed_currencies: Vec<String>,
    pub retry_count: u32,
}

impl JobRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: JobStatus::Running,
            start_time: now,
            end_time: None,
            duration_secs: None,
            completed_currencies: Vec::new(),
            failed_currencies: Vec::new(),
            retry_count: 0,
        }
    }
}

/// Job lifecycle and per-currency retry bookkeeping over a shared Redis
/// instance. Every operation here is a pure state transition over cache
/// keys; nothing here touches the relational store.
pub struct ProgressTracker {
    pool: Pool,
    job_ttl_secs: u64,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            job_ttl_secs: DEFAULT_JOB_TTL_SECS,
        }
    }

    #[must_use]
    pub fn with_job_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.job_ttl_secs = ttl_secs;
        self
    }

    fn job_key(job_id: &str) -> String {
        format!("job:{job_id}")
    }

    fn retry_key(job_id: &str, code: &str) -> String {
        format!("retry:{job_id}:{code}")
    }

    async fn put(&self, key: &str, record: &JobRecord) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let payload = serde_json::to_string(record)?;
        let () = conn.set_ex(key, payload, self.job_ttl_secs).await?;
        Ok(())
    }

    /// Fetch the current record for `job_id`, if it still exists (it may
    /// have expired per the cache's TTL).
    ///
    /// # Errors
    /// Returns [`CacheError`] on a Redis failure or a corrupt stored value.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<JobRecord>, CacheError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(Self::job_key(job_id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Initialize `job:<job_id>` with `status=running` and empty bookkeeping.
    ///
    /// # Errors
    /// Returns [`CacheError`] on a Redis failure.
    pub async fn start_job(&self, job_id: &str) -> Result<JobRecord, CacheError> {
        let record = JobRecord::new(Utc::now());
        self.put(&Self::job_key(job_id), &record).await?;
        tracing::info!(job_id, "job started");
        Ok(record)
    }

    /// Append `code` to the job's completed-currency list, idempotently.
    ///
    /// # Errors
    /// Returns [`CacheError::JobNotFound`] if the job record has already
    /// expired, or a Redis failure.
    pub async fn mark_currency_complete(&self, job_id: &str, code: &str) -> Result<(), CacheError> {
        let mut record = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| CacheError::JobNotFound(job_id.to_string()))?;
        if !record.completed_currencies.iter().any(|c| c == code) {
            record.completed_currencies.push(code.to_string());
        }
        self.put(&Self::job_key(job_id), &record).await?;
        tracing::info!(job_id, code, "currency marked complete");
        Ok(())
    }

    /// Append `code` to the job's failed-currency list, idempotently.
    ///
    /// # Errors
    /// Returns [`CacheError::JobNotFound`] if the job record has already
    /// expired, or a Redis failure.
    pub async fn mark_currency_failed(&self, job_id: &str, code: &str) -> Result<(), CacheError> {
        let mut record = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| CacheError::JobNotFound(job_id.to_string()))?;
        if !record.failed_currencies.iter().any(|c| c == code) {
            record.failed_currencies.push(code.to_string());
        }
        self.put(&Self::job_key(job_id), &record).await?;
        tracing::warn!(job_id, code, "currency marked failed");
        Ok(())
    }

    /// Atomically decide whether `(job_id, code)` has retry budget left,
    /// incrementing its counter as a side effect. The first call for a key
    /// initializes the counter to 1 and returns `true`; the counter is
    /// capped at `max_retries`.
    ///
    /// # Errors
    /// Returns [`CacheError`] on a Redis failure.
    pub async fn should_retry_currency(
        &self,
        job_id: &str,
        code: &str,
        max_retries: u32,
    ) -> Result<bool, CacheError> {
        let mut conn = self.pool.get().await?;
        let script = redis::Script::new(SHOULD_RETRY_SCRIPT);
        let allowed: i32 = script
            .key(Self::retry_key(job_id, code))
            .arg(max_retries)
            .arg(self.job_ttl_secs)
            .invoke_async(&mut conn)
            .await?;
        tracing::info!(job_id, code, allowed, "retry eligibility decided");
        Ok(allowed == 1)
    }

    /// Set the job's terminal status, end time, and computed duration.
    ///
    /// # Errors
    /// Returns [`CacheError::JobNotFound`] if the job record has already
    /// expired, or a Redis failure.
    pub async fn complete_job(&self, job_id: &str, status: JobStatus) -> Result<JobRecord, CacheError> {
        let mut record = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| CacheError::JobNotFound(job_id.to_string()))?;
        let now = Utc::now();
        record.status = status;
        record.end_time = Some(now);
        record.duration_secs = Some((now - record.start_time).num_milliseconds() as f64 / 1000.0);
        self.put(&Self::job_key(job_id), &record).await?;
        tracing::info!(job_id, ?status, "job completed");
        Ok(record)
    }
}
