use deadpool_redis::Pool as RedisPool;
use koel_storage::partition;
use sqlx::PgPool;

use crate::error::OrchestratorError;

/// Creates the next month's exchange-rate partition (relative to `now`),
/// plus defensively creates the current month's if it's somehow still
/// missing — the cold-start guard from the partition-boundary-race design
/// decision. Runs on the days-28-31 cron trigger.
///
/// # Errors
/// Returns [`OrchestratorError::Storage`] on any database failure.
pub async fn run_partition_create(pool: &PgPool, now: chrono::DateTime<chrono::Utc>) -> Result<(), OrchestratorError> {
    let mut conn = pool.acquire().await?;
    partition::create_month_partition(&mut conn, now, 0).await?;
    partition::create_month_partition(&mut conn, now, 1).await?;
    Ok(())
}

/// Sunday 03:00 cleanup: drops partitions past the retention window,
/// vacuums the survivors plus the parent and currency tables, and
/// invalidates every cache key the partition lifecycle makes stale.
///
/// # Errors
/// Returns [`OrchestratorError::Storage`] on any database failure or
/// [`OrchestratorError::Cache`] if the invalidation sweep can't reach Redis.
pub async fn run_cleanup(
    pool: &PgPool,
    cache: &RedisPool,
    now: chrono::DateTime<chrono::Utc>,
    retention_months: i64,
) -> Result<Vec<String>, OrchestratorError> {
    let mut conn = pool.acquire().await?;
    let dropped = partition::retention_sweep(&mut conn, now, retention_months).await?;
    drop(conn);
    koel_cache::invalidate_all(cache).await?;
    Ok(dropped)
}
