//! End-to-end orchestrator tests against a real Postgres/Redis pair, using
//! an in-memory fake source so no network traffic leaves the process.
//! Requires both `DATABASE_URL` and `REDIS_URL`; skipped automatically when
//! either is unset.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as RedisConfig, Runtime};
use koel_cache::ProgressTracker;
use koel_core::{AdapterError, AdapterRegistry, FetchContext, ScraperManager, SourceAdapter, UserAgentPool};
use koel_storage::currency::upsert_by_code;
use koel_types::{AppConfig, Capability};
use koel_worker::orchestrator::CurrencyGroup;
use koel_worker::Orchestrator;
use sqlx::PgPool;

struct FixedRateSource {
    rates: BTreeMap<String, f64>,
}

#[async_trait]
impl SourceAdapter for FixedRateSource {
    fn name(&self) -> &'static str {
        "trading-economics"
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    async fn fetch_multi(&self, _ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        Ok(self.rates.clone())
    }
}

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
async fn group_sweep_writes_rates_and_completes_progress() {
    let Some((pool, redis_pool)) = test_infra().await else { return };

    let mut conn = pool.acquire().await.unwrap();
    upsert_by_code(&mut conn, "USD", "US Dollar", Some("US dollars"), "$", 2).await.unwrap();
    upsert_by_code(&mut conn, "EUR", "Euro", Some("euros"), "€", 2).await.unwrap();
    drop(conn);

    let mut rates = BTreeMap::new();
    rates.insert("EUR".to_string(), 0.92);

    let registry = AdapterRegistry::new()
        .with_priority(vec!["trading-economics".to_string()])
        .with_source(Arc::new(FixedRateSource { rates }));

    let manager = ScraperManager::new(
        registry,
        Duration::from_millis(0),
        Duration::from_secs(5),
        Arc::new(UserAgentPool::builtin()),
    );

    let progress = ProgressTracker::new(redis_pool);
    let mut config = AppConfig::default();
    config.primary_currencies = vec!["USD".to_string()];

    let orchestrator = Orchestrator::new(manager, pool, progress, config);
    let job_id = format!("test_group_sweep_{}", std::process::id());

    let summary = orchestrator.group_sweep(&job_id, CurrencyGroup::Primary).await.unwrap();

    assert!(summary.rows_written >= 1);
    assert!(summary.failed_currencies.is_empty());
}
