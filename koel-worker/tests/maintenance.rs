//! End-to-end maintenance-sweep tests against real Postgres and Redis.
//! Require both `DATABASE_URL` and `REDIS_URL`; skipped automatically when
//! either is unset.

use chrono::{TimeZone, Utc};
use deadpool_redis::{Config as RedisConfig, Runtime};
use koel_worker::maintenance;
use sqlx::PgPool;

async fn test_infra() -> Option<(PgPool, deadpool_redis::Pool)> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    let redis_url = std::env::var("REDIS_URL").ok()?;

    let pool = PgPool::connect(&db_url).await.expect("connect to test database");
    sqlx::migrate!("../koel-storage/migrations").run(&pool).await.expect("apply migrations");

    let redis_pool = RedisConfig::from_url(redis_url)
        .create_pool(Some(Runtime::Tokio1))
        .expect("build redis pool");

    Some((pool, redis_pool))
}

#[tokio::test]
async fn partition_create_then_cleanup_round_trips() {
    let Some((pool, redis_pool)) = test_infra().await else { return };

    let now = Utc.with_ymd_and_hms(2025, 5, 29, 0, 0, 0).unwrap();
    maintenance::run_partition_create(&pool, now).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let partitions = koel_storage::partition::list_partitions(&mut conn).await.unwrap();
    assert!(partitions.iter().any(|p| p.name == "exchange_rates_2025_05"));
    assert!(partitions.iter().any(|p| p.name == "exchange_rates_2025_06"));
    drop(conn);

    let far_future = now + chrono::Duration::days(365 * 2);
    let dropped = maintenance::run_cleanup(&pool, &redis_pool, far_future, 6).await.unwrap();
    assert!(dropped.iter().any(|name| name == "exchange_rates_2025_05"));
}
