use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::error::CacheError;

/// Key patterns a full maintenance sweep clears. `currencies:*` is the
/// catalog list cache, `currency:*` per-code lookups, `exchange_rates:*`
/// any cached rate reads, and `job:*`/`retry:*` leftover progress state from
/// jobs that finished (or died) without cleaning up after themselves.
pub const INVALIDATION_PATTERNS: &[&str] = &[
    "job:*",
    "retry:*",
    "currencies:*",
    "currency:*",
    "exchange_rates:*",
];

/// Delete every key matching `pattern` using non-blocking `SCAN` cursors
/// rather than `KEYS`, which would stall the Redis event loop on a large
/// keyspace. Returns the number of keys removed.
///
/// # Errors
/// Returns [`CacheError`] on a Redis failure.
pub async fn invalidate_pattern(pool: &Pool, pattern: &str) -> Result<u64, CacheError> {
    let mut conn = pool.get().await?;
    let mut cursor: u64 = 0;
    let mut removed: u64 = 0;
    loop {
        let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(250)
            .query_async(&mut conn)
            .await?;
        if !keys.is_empty() {
            removed += conn.del::<_, u64>(&keys).await?;
        }
        cursor = next_cursor;
        if cursor == 0 {
            break;
        }
    }
    tracing::info!(pattern, removed, "cache pattern invalidated");
    Ok(removed)
}

/// Run [`invalidate_pattern`] over every pattern in [`INVALIDATION_PATTERNS`],
/// returning the total number of keys removed. Used by the maintenance
/// binary's periodic sweep, independently of relational partition cleanup.
///
/// # Errors
/// Returns [`CacheError`] on a Redis failure.
pub async fn invalidate_all(pool: &Pool) -> Result<u64, CacheError> {
    let mut total = 0;
    for pattern in INVALIDATION_PATTERNS {
        total += invalidate_pattern(pool, pattern).await?;
    }
    Ok(total)
}
