//! Scheduling binary: wires the cron surface (primary/secondary sweeps,
//! weekly cleanup, month-end partition creation) to the orchestrator via
//! `tokio-cron-scheduler`.

use std::sync::Arc;

use deadpool_redis::{Config as RedisConfig, Runtime};
use koel_cache::ProgressTracker;
use koel_core::{ScraperManager, UserAgentPool};
use koel_worker::orchestrator::CurrencyGroup;
use koel_worker::{maintenance, notify::NotifyLayer, retry, Orchestrator};
use koel_types::AppConfig;
use sqlx::postgres::PgPoolOptions;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config);

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    let redis_pool = RedisConfig::from_url(config.redis_url.clone()).create_pool(Some(Runtime::Tokio1))?;
    let progress = ProgressTracker::new(redis_pool.clone());

    let user_agents = Arc::new(
        UserAgentPool::from_file(&config.user_agents_path).unwrap_or_else(|_| UserAgentPool::builtin()),
    );
    let manager = ScraperManager::new(
        koel_adapters::default_registry(),
        config.rate_limit_delay(),
        config.provider_timeout(),
        user_agents,
    );
    let orchestrator = Arc::new(Orchestrator::new(manager, pool.clone(), progress, config.clone()));

    let scheduler = JobScheduler::new().await?;

    scheduler.add(group_sweep_job("0 0 0,6,12,18 * * *", "primary_sweep", CurrencyGroup::Primary, orchestrator.clone())?).await?;
    scheduler.add(group_sweep_job("0 0 3,15 * * *", "secondary_sweep", CurrencyGroup::Secondary, orchestrator.clone())?).await?;
    scheduler.add(cleanup_job(pool.clone(), redis_pool.clone(), config.partition_retention_months)?).await?;
    scheduler.add(partition_create_job(pool.clone())?).await?;

    scheduler.start().await?;
    tracing::info!("koel-worker scheduler started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match &config.notify_webhook_url {
        Some(url) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .with(NotifyLayer::new(url.as_str()))
                .init();
        }
        None => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }
}

fn group_sweep_job(
    schedule: &str,
    kind: &'static str,
    group: CurrencyGroup,
    orchestrator: Arc<Orchestrator>,
) -> Result<Job, Box<dyn std::error::Error>> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let orchestrator = orchestrator.clone();
        Box::pin(async move {
            match retry::run_group_sweep_with_retries(orchestrator.clone(), kind, group).await {
                Some((id, summary)) => {
                    tracing::info!(
                        job_id = %id,
                        rows_written = summary.rows_written,
                        failed = summary.failed_currencies.len(),
                        "group sweep complete",
                    );
                    for code in summary.retryable_currencies {
                        tokio::spawn(retry::run_retry_chain(orchestrator.clone(), id.clone(), code));
                    }
                }
                None => tracing::error!(kind, "group sweep exhausted its orchestrator-level retries"),
            }
        })
    })?;
    Ok(job)
}

fn cleanup_job(pool: sqlx::PgPool, cache: deadpool_redis::Pool, retention_months: i64) -> Result<Job, Box<dyn std::error::Error>> {
    let job = Job::new_async("0 0 3 * * Sun", move |_uuid, _lock| {
        let pool = pool.clone();
        let cache = cache.clone();
        Box::pin(async move {
            match maintenance::run_cleanup(&pool, &cache, chrono::Utc::now(), retention_months).await {
                Ok(dropped) => tracing::info!(dropped = ?dropped, "retention cleanup complete"),
                Err(err) => tracing::error!(error = %err, "retention cleanup failed"),
            }
        })
    })?;
    Ok(job)
}

fn partition_create_job(pool: sqlx::PgPool) -> Result<Job, Box<dyn std::error::Error>> {
    let job = Job::new_async("0 0 0 28-31 * *", move |_uuid, _lock| {
        let pool = pool.clone();
        Box::pin(async move {
            match maintenance::run_partition_create(&pool, chrono::Utc::now()).await {
                Ok(()) => tracing::info!("partition pre-creation complete"),
                Err(err) => tracing::error!(error = %err, "partition pre-creation failed"),
            }
        })
    })?;
    Ok(job)
}

