use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use koel_core::{AdapterError, AdapterRegistry, FetchContext, ManagerError, ScrapeRequest, ScraperManager, SourceAdapter, UserAgentPool};
use koel_types::Capability;

struct MultiPairStub {
    name: &'static str,
    rates: BTreeMap<String, f64>,
}

#[async_trait]
impl SourceAdapter for MultiPairStub {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    async fn fetch_multi(&self, _ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        Ok(self.rates.clone())
    }
}

struct FailingMultiPairStub {
    name: &'static str,
}

#[async_trait]
impl SourceAdapter for FailingMultiPairStub {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        Capability::MultiPair
    }

    async fn fetch_multi(&self, _ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
        Err(AdapterError::EmptyResult)
    }
}

/// A single-pair stub that returns a fixed rate for every target except the
/// ones listed in `missing`, which it reports as errors.
struct SinglePairStub {
    name: &'static str,
    missing: Vec<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SourceAdapter for SinglePairStub {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capability(&self) -> Capability {
        Capability::SinglePair
    }

    async fn fetch_single(&self, _ctx: &FetchContext<'_>, target: &str) -> Result<f64, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.iter().any(|m| m == target) {
            Err(AdapterError::MissingField(target.to_string()))
        } else {
            Ok(1.0)
        }
    }
}

fn manager(registry: AdapterRegistry) -> ScraperManager {
    ScraperManager::new(
        registry,
        Duration::from_millis(1),
        Duration::from_secs(1),
        Arc::new(UserAgentPool::builtin()),
    )
}

#[tokio::test]
async fn happy_path_multi_pair_wins() {
    let mut rates = BTreeMap::new();
    rates.insert("EUR".to_string(), 0.9);
    rates.insert("GBP".to_string(), 0.8);

    let registry = AdapterRegistry::new()
        .with_priority(vec!["trading-economics".to_string()])
        .with_source(Arc::new(MultiPairStub { name: "trading-economics", rates }));

    let manager = manager(registry);
    let req = ScrapeRequest {
        base_currency: "USD",
        target_currencies: None,
        base_name: None,
        base_name_plural: None,
    };

    let result = manager.scrape_with_failsafe(&req).await.unwrap();
    assert_eq!(result.source, "trading-economics");
    assert_eq!(result.rates.get("EUR"), Some(&0.9));
    assert_eq!(result.rates.get("GBP"), Some(&0.8));
}

#[tokio::test]
async fn multi_pair_all_fail_single_pair_succeeds() {
    let registry = AdapterRegistry::new()
        .with_priority(vec![
            "trading-economics".to_string(),
            "hexa-rate".to_string(),
        ])
        .with_source(Arc::new(FailingMultiPairStub { name: "trading-economics" }))
        .with_source(Arc::new(SinglePairStub {
            name: "hexa-rate",
            missing: vec![],
            calls: Arc::new(AtomicUsize::new(0)),
        }));

    let manager = manager(registry);
    let targets = vec!["EUR".to_string(), "GBP".to_string()];
    let req = ScrapeRequest {
        base_currency: "USD",
        target_currencies: Some(&targets),
        base_name: None,
        base_name_plural: None,
    };

    let result = manager.scrape_with_failsafe(&req).await.unwrap();
    assert_eq!(result.source, "hexa-rate");
    assert_eq!(result.rates.len(), 2);
}

#[tokio::test]
async fn single_pair_partial_failure_aborts_the_source() {
    let registry = AdapterRegistry::new()
        .with_priority(vec!["hexa-rate".to_string(), "fx-empire".to_string()])
        .with_source(Arc::new(SinglePairStub {
            name: "hexa-rate",
            missing: vec!["GBP".to_string()],
            calls: Arc::new(AtomicUsize::new(0)),
        }))
        .with_source(Arc::new(SinglePairStub {
            name: "fx-empire",
            missing: vec![],
            calls: Arc::new(AtomicUsize::new(0)),
        }));

    let manager = manager(registry);
    let targets = vec!["EUR".to_string(), "GBP".to_string()];
    let req = ScrapeRequest {
        base_currency: "USD",
        target_currencies: Some(&targets),
        base_name: None,
        base_name_plural: None,
    };

    let result = manager.scrape_with_failsafe(&req).await.unwrap();
    assert_eq!(result.source, "fx-empire");
}

#[tokio::test]
async fn all_sources_fail_reports_every_error() {
    let registry = AdapterRegistry::new()
        .with_priority(vec!["trading-economics".to_string(), "hexa-rate".to_string()])
        .with_source(Arc::new(FailingMultiPairStub { name: "trading-economics" }))
        .with_source(Arc::new(SinglePairStub {
            name: "hexa-rate",
            missing: vec!["EUR".to_string()],
            calls: Arc::new(AtomicUsize::new(0)),
        }));

    let manager = manager(registry);
    let targets = vec!["EUR".to_string()];
    let req = ScrapeRequest {
        base_currency: "USD",
        target_currencies: Some(&targets),
        base_name: None,
        base_name_plural: None,
    };

    let err = manager.scrape_with_failsafe(&req).await.unwrap_err();
    match err {
        ManagerError::AllSourcesFailed { base_currency, errors } => {
            assert_eq!(base_currency, "USD");
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected AllSourcesFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn sources_needing_unavailable_parameters_are_skipped() {
    struct NeedsBaseName;

    #[async_trait]
    impl SourceAdapter for NeedsBaseName {
        fn name(&self) -> &'static str {
            "exchange-rates-org-uk"
        }

        fn capability(&self) -> Capability {
            Capability::MultiPair
        }

        fn needs_base_name(&self) -> bool {
            true
        }

        async fn fetch_multi(&self, _ctx: &FetchContext<'_>) -> Result<BTreeMap<String, f64>, AdapterError> {
            panic!("should never be called without base_name");
        }
    }

    let registry = AdapterRegistry::new()
        .with_priority(vec!["exchange-rates-org-uk".to_string()])
        .with_source(Arc::new(NeedsBaseName));

    let manager = manager(registry);
    let req = ScrapeRequest {
        base_currency: "USD",
        target_currencies: None,
        base_name: None,
        base_name_plural: None,
    };

    let err = manager.scrape_with_failsafe(&req).await.unwrap_err();
    assert!(matches!(err, ManagerError::NoEligibleSources { .. }));
}
