use std::sync::Arc;
use std::time::Duration;

use koel_types::ScrapeResult;

use crate::adapter::FetchContext;
use crate::error::{AdapterError, ManagerError};
use crate::ratelimit::RateLimiter;
use crate::registry::AdapterRegistry;
use crate::useragent::UserAgentPool;

/// Parameters for one failsafe scrape attempt.
///
/// `base_name`/`base_name_plural` are only needed by the handful of sources
/// that embed the currency's display name in their URL; most requests can
/// leave them `None`.
pub struct ScrapeRequest<'a> {
    pub base_currency: &'a str,
    pub target_currencies: Option<&'a [String]>,
    pub base_name: Option<&'a str>,
    pub base_name_plural: Option<&'a str>,
}

/// Orchestrates a priority-ordered, two-phase failsafe scrape across every
/// registered source.
///
/// Phase A tries multi-pair sources in priority order and returns the first
/// one that yields a non-empty rate map. If every multi-pair source fails
/// and target currencies were supplied, Phase B tries single-pair sources:
/// a single-pair source only counts as a success if it returns every
/// requested target, so a partial failure moves on to the next source
/// rather than returning an incomplete result.
pub struct ScraperManager {
    registry: AdapterRegistry,
    rate_limiter: RateLimiter,
    client: reqwest::Client,
    user_agents: Arc<UserAgentPool>,
    timeout: Duration,
}

impl ScraperManager {
    #[must_use]
    pub fn new(
        registry: AdapterRegistry,
        rate_limit_delay: Duration,
        timeout: Duration,
        user_agents: Arc<UserAgentPool>,
    ) -> Self {
        Self {
            registry,
            rate_limiter: RateLimiter::new(rate_limit_delay),
            client: reqwest::Client::new(),
            user_agents,
            timeout,
        }
    }

    fn context<'a>(&'a self, base_currency: &'a str, base_name: Option<&'a str>, base_name_plural: Option<&'a str>) -> FetchContext<'a> {
        FetchContext {
            base_currency,
            base_name,
            base_name_plural,
            client: &self.client,
            user_agent: self.user_agents.random(),
            timeout: self.timeout,
        }
    }

    /// Run the full two-phase failsafe scrape described on [`ScraperManager`].
    ///
    /// # Errors
    /// Returns [`ManagerError::AllSourcesFailed`] once every eligible source
    /// (across both phases) has been attempted without success, or
    /// [`ManagerError::NoEligibleSources`] if nothing was eligible to begin
    /// with.
    #[tracing::instrument(skip(self, req), fields(base = %req.base_currency))]
    pub async fn scrape_with_failsafe(
        &self,
        req: &ScrapeRequest<'_>,
    ) -> Result<ScrapeResult, ManagerError> {
        let mut errors: Vec<(String, AdapterError)> = Vec::new();
        let mut attempted_any = false;

        for source in self.registry.ordered() {
            if source.capability != koel_types::Capability::MultiPair {
                continue;
            }
            if (source.needs_base_name && req.base_name.is_none())
                || (source.needs_base_plural && req.base_name_plural.is_none())
            {
                continue;
            }

            attempted_any = true;
            self.rate_limiter.wait().await;
            let ctx = self.context(req.base_currency, req.base_name, req.base_name_plural);

            tracing::info!(source = source.name, base = req.base_currency, "dispatching multi-pair source");
            match tokio::time::timeout(self.timeout, source.adapter.fetch_multi(&ctx)).await {
                Ok(Ok(rates)) if !rates.is_empty() => {
                    tracing::info!(source = source.name, base = req.base_currency, pairs = rates.len(), "source succeeded");
                    return Ok(ScrapeResult::new(rates, source.name));
                }
                Ok(Ok(_)) => {
                    tracing::warn!(source = source.name, base = req.base_currency, "source returned an empty result");
                    errors.push((source.name.to_string(), AdapterError::EmptyResult));
                }
                Ok(Err(e)) => {
                    tracing::warn!(source = source.name, base = req.base_currency, error = %e, "source failed");
                    errors.push((source.name.to_string(), e));
                }
                Err(_) => {
                    tracing::warn!(source = source.name, base = req.base_currency, "source timed out");
                    errors.push((source.name.to_string(), AdapterError::Timeout(self.timeout)));
                }
            }
        }

        if let Some(targets) = req.target_currencies {
            if !targets.is_empty() {
                for source in self.registry.ordered() {
                    if source.capability != koel_types::Capability::SinglePair {
                        continue;
                    }
                    if (source.needs_base_name && req.base_name.is_none())
                        || (source.needs_base_plural && req.base_name_plural.is_none())
                    {
                        continue;
                    }

                    attempted_any = true;
                    tracing::info!(source = source.name, base = req.base_currency, "dispatching single-pair source");
                    match self.try_single_pair_source(source, req, targets).await {
                        Ok(rates) => {
                            tracing::info!(source = source.name, base = req.base_currency, pairs = rates.len(), "source succeeded");
                            return Ok(ScrapeResult::new(rates, source.name));
                        }
                        Err(e) => {
                            tracing::warn!(source = source.name, base = req.base_currency, error = %e, "source failed");
                            errors.push((source.name.to_string(), e));
                        }
                    }
                }
            }
        }

        if !attempted_any {
            tracing::error!(base = req.base_currency, "no eligible source for this request");
            return Err(ManagerError::NoEligibleSources {
                base_currency: req.base_currency.to_string(),
            });
        }

        tracing::error!(base = req.base_currency, attempts = errors.len(), "every source failed");
        Err(ManagerError::AllSourcesFailed {
            base_currency: req.base_currency.to_string(),
            errors,
        })
    }

    async fn try_single_pair_source(
        &self,
        source: &crate::registry::SourceDescriptor,
        req: &ScrapeRequest<'_>,
        targets: &[String],
    ) -> Result<std::collections::BTreeMap<String, f64>, AdapterError> {
        let mut rates = std::collections::BTreeMap::new();

        for target in targets {
            self.rate_limiter.wait().await;
            let ctx = self.context(req.base_currency, req.base_name, req.base_name_plural);

            let rate = tokio::time::timeout(self.timeout, source.adapter.fetch_single(&ctx, target))
                .await
                .map_err(|_| AdapterError::Timeout(self.timeout))??;
            rates.insert(target.clone(), rate);
        }

        if rates.is_empty() {
            Err(AdapterError::EmptyResult)
        } else {
            Ok(rates)
        }
    }
}
