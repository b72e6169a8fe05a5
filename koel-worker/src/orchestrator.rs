use koel_cache::{JobStatus, ProgressTracker};
use koel_core::{ManagerError, ScrapeRequest, ScraperManager};
use koel_types::{AppConfig, Currency, ExchangeRate};
use sqlx::PgPool;

use crate::error::OrchestratorError;

/// Which hard-coded currency cadence group a job sweeps, per the Open
/// Question decision in the design notes: the two lists ship as compiled-in
/// `AppConfig` defaults and are resolved against the currency table by code
/// at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyGroup {
    Primary,
    Secondary,
}

/// Outcome of one full or group sweep: how many rows were written, and
/// which bases failed outright (and among those, which still have retry
/// budget left and should be requeued).
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub rows_written: u64,
    pub failed_currencies: Vec<String>,
    pub retryable_currencies: Vec<String>,
}

/// Ties the scraper manager, the relational writer, and the progress
/// tracker together into the three job shapes described by the Job
/// Orchestrator component: full sweep, group sweep, and single-currency
/// retry. All three are idempotent per `job_id`.
pub struct Orchestrator {
    manager: ScraperManager,
    pool: PgPool,
    progress: ProgressTracker,
    config: AppConfig,
}

impl Orchestrator {
    #[must_use]
    pub fn new(manager: ScraperManager, pool: PgPool, progress: ProgressTracker, config: AppConfig) -> Self {
        Self { manager, pool, progress, config }
    }

    /// Scrape every currency in the catalog against every other currency.
    ///
    /// # Errors
    /// Returns [`OrchestratorError`] if the currency catalog can't be
    /// loaded, the cache can't be reached, or the final batch upsert fails.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn full_sweep(&self, job_id: &str) -> Result<SweepSummary, OrchestratorError> {
        let mut conn = self.pool.acquire().await?;
        let currencies = koel_storage::currency::list_all(&mut conn).await?;
        drop(conn);
        self.sweep(job_id, &currencies).await
    }

    /// Scrape only the currencies configured for `group`, against every
    /// other currency in the catalog (not just the group).
    ///
    /// # Errors
    /// Returns [`OrchestratorError`] if the currency catalog can't be
    /// loaded, the cache can't be reached, or the final batch upsert fails.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn group_sweep(&self, job_id: &str, group: CurrencyGroup) -> Result<SweepSummary, OrchestratorError> {
        let codes = match group {
            CurrencyGroup::Primary => &self.config.primary_currencies,
            CurrencyGroup::Secondary => &self.config.secondary_currencies,
        };
        let mut conn = self.pool.acquire().await?;
        let bases = koel_storage::currency::list_by_codes(&mut conn, codes).await?;
        let all = koel_storage::currency::list_all(&mut conn).await?;
        drop(conn);
        self.sweep_against(job_id, &bases, &all).await
    }

    async fn sweep(&self, job_id: &str, currencies: &[Currency]) -> Result<SweepSummary, OrchestratorError> {
        self.sweep_against(job_id, currencies, currencies).await
    }

    /// Core sweep loop: for each base in `bases`, run the failsafe scrape
    /// against every other code in `universe`, accumulate successful rates
    /// into one batch, and upsert the whole batch in a single transaction
    /// once the loop finishes — so a base currency's rates and every other
    /// base's rates from the same job land together or not at all.
    async fn sweep_against(
        &self,
        job_id: &str,
        bases: &[Currency],
        universe: &[Currency],
    ) -> Result<SweepSummary, OrchestratorError> {
        self.progress.start_job(job_id).await?;
        tracing::info!(job_id, base_count = bases.len(), "sweep started");

        let mut batch = Vec::new();
        let mut failed = Vec::new();

        for base in bases {
            let targets: Vec<String> = universe
                .iter()
                .filter(|c| c.code != base.code)
                .map(|c| c.code.clone())
                .collect();

            let req = ScrapeRequest {
                base_currency: &base.code,
                target_currencies: Some(&targets),
                base_name: Some(base.name.as_str()),
                base_name_plural: base.name_plural.as_deref(),
            };

            match self.manager.scrape_with_failsafe(&req).await {
                Ok(result) => {
                    for (target_code, rate) in &result.rates {
                        if let Some(target) = universe.iter().find(|c| &c.code == target_code) {
                            batch.push(ExchangeRate {
                                base_currency_id: base.id,
                                target_currency_id: target.id,
                                rate: *rate,
                                source: result.source.clone(),
                                created_at: result.timestamp,
                            });
                        }
                    }
                    self.progress.mark_currency_complete(job_id, &base.code).await?;
                }
                Err(err) => {
                    tracing::warn!(base = %base.code, error = %err, "base currency failed every source");
                    self.progress.mark_currency_failed(job_id, &base.code).await?;
                    failed.push(base.code.clone());
                }
            }
        }

        let mut txn = self.pool.begin().await?;
        let rows_written = koel_storage::writer::upsert_rates(&mut txn, &batch).await?;
        txn.commit().await?;

        self.progress.complete_job(job_id, JobStatus::Completed).await?;
        tracing::info!(job_id, rows_written, failed = failed.len(), "sweep completed");

        let mut retryable_currencies = Vec::new();
        for code in &failed {
            if self
                .progress
                .should_retry_currency(job_id, code, self.config.max_retries)
                .await?
            {
                retryable_currencies.push(code.clone());
            }
        }

        Ok(SweepSummary { rows_written, failed_currencies: failed, retryable_currencies })
    }

    /// Scrape a single base currency against every other currency and
    /// upsert within one committing transaction. Used both for the
    /// 5-minute single-currency retry scheduled after a sweep failure and
    /// for the 15-minute single-source escalation retry.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::UnknownCurrency`] if `base_code` is not
    /// in the catalog, or propagates the scrape/storage/cache failure
    /// otherwise.
    #[tracing::instrument(skip(self), fields(job_id = %job_id, base = %base_code))]
    pub async fn single_currency_retry(&self, job_id: &str, base_code: &str) -> Result<u64, OrchestratorError> {
        let mut conn = self.pool.acquire().await?;
        let universe = koel_storage::currency::list_all(&mut conn).await?;
        drop(conn);

        let base = universe
            .iter()
            .find(|c| c.code == base_code)
            .ok_or_else(|| OrchestratorError::UnknownCurrency(base_code.to_string()))?;

        let targets: Vec<String> = universe
            .iter()
            .filter(|c| c.code != base.code)
            .map(|c| c.code.clone())
            .collect();

        let req = ScrapeRequest {
            base_currency: &base.code,
            target_currencies: Some(&targets),
            base_name: Some(base.name.as_str()),
            base_name_plural: base.name_plural.as_deref(),
        };

        self.progress.start_job(job_id).await?;

        match self.manager.scrape_with_failsafe(&req).await {
            Ok(result) => {
                let rates: Vec<ExchangeRate> = result
                    .rates
                    .iter()
                    .filter_map(|(code, rate)| {
                        universe.iter().find(|c| &c.code == code).map(|target| ExchangeRate {
                            base_currency_id: base.id,
                            target_currency_id: target.id,
                            rate: *rate,
                            source: result.source.clone(),
                            created_at: result.timestamp,
                        })
                    })
                    .collect();

                let rows_written = koel_storage::writer::upsert_rates_committing(&self.pool, &rates).await?;
                self.progress.mark_currency_complete(job_id, base_code).await?;
                self.progress.complete_job(job_id, JobStatus::Completed).await?;
                tracing::info!(job_id, base = base_code, rows_written, "single-currency retry completed");
                Ok(rows_written)
            }
            Err(err) => {
                tracing::error!(job_id, base = base_code, error = %err, "single-currency retry failed");
                self.progress.mark_currency_failed(job_id, base_code).await?;
                self.progress.complete_job(job_id, JobStatus::Failed).await?;
                Err(OrchestratorError::Manager(err))
            }
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// `true` iff `err` is the single failure mode worth a second-tier,
/// 15-minute escalation retry rather than being treated as a permanent
/// failure for this job.
#[must_use]
pub fn is_escalation_candidate(err: &OrchestratorError) -> bool {
    matches!(err, OrchestratorError::Manager(ManagerError::AllSourcesFailed { .. }))
}
