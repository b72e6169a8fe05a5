use thiserror::Error;

/// Failure modes for a single adapter call.
///
/// The manager never propagates these directly; every variant is collected
/// into a [`ManagerError::AllSourcesFailed`] once every candidate source has
/// been exhausted.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The underlying HTTP request failed (connect, timeout, non-2xx status).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the shape this adapter expects.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A field the transform step depends on was absent from the response.
    #[error("missing expected field: {0}")]
    MissingField(String),

    /// The adapter extracted zero usable rates.
    #[error("source returned no rates")]
    EmptyResult,

    /// A required parameter (base currency name, plural form) was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The adapter call exceeded its configured timeout.
    #[error("adapter timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Failure modes surfaced by [`crate::manager::ScraperManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Every eligible source for this request was attempted and failed.
    ///
    /// Carries the per-source errors in priority order, so callers can log
    /// or report the full failure chain rather than just the last one.
    #[error("all sources failed for base currency {base_currency}: {errors:?}")]
    AllSourcesFailed {
        base_currency: String,
        errors: Vec<(String, AdapterError)>,
    },

    /// No registered source is eligible for this request at all (e.g. every
    /// multi-pair source needs parameters that were not supplied, and no
    /// target currencies were given to fall back to single-pair sources).
    #[error("no eligible sources for base currency {base_currency}")]
    NoEligibleSources { base_currency: String },
}
