use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation of one currency pair's rate, as persisted.
///
/// Invariants enforced by the storage layer: `base_currency_id !=
/// target_currency_id`, `rate > 0.0`, and the triple `(base_currency_id,
/// target_currency_id, created_at)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base_currency_id: i32,
    pub target_currency_id: i32,
    pub rate: f64,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Transient result of one successful manager sweep: a mapping of target
/// currency code to rate, tagged with the source that produced it.
///
/// Never persisted as-is; the orchestrator resolves target codes to ids
/// and turns each entry into an [`ExchangeRate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub rates: BTreeMap<String, f64>,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeResult {
    #[must_use]
    pub fn new(rates: BTreeMap<String, f64>, source: impl Into<String>) -> Self {
        Self {
            rates,
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}
