use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use koel_types::Capability;

use crate::error::AdapterError;

/// Everything an adapter needs to build its request: the base currency, the
/// optional full/plural names a handful of sources require, and the
/// transport to use so the manager can enforce one client/timeout/User-Agent
/// policy across every source.
pub struct FetchContext<'a> {
    pub base_currency: &'a str,
    pub base_name: Option<&'a str>,
    pub base_name_plural: Option<&'a str>,
    pub client: &'a reqwest::Client,
    pub user_agent: &'a str,
    pub timeout: Duration,
}

impl<'a> FetchContext<'a> {
    #[must_use]
    pub fn headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(self.user_agent)
                .unwrap_or_else(|_| reqwest::header::HeaderValue::from_static("koel/0.1")),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            reqwest::header::HeaderValue::from_static("gzip, deflate"),
        );
        headers.insert(
            reqwest::header::CONNECTION,
            reqwest::header::HeaderValue::from_static("keep-alive"),
        );
        headers
    }
}

/// ETL contract a currency-rate source implements: fetch raw data, then
/// parse it into a `{ target_code: rate }` map. A source declares its
/// [`Capability`] up front so the manager can route multi-pair requests
/// (one call, many rates) separately from single-pair requests (one call
/// per target).
///
/// A given adapter only ever implements the method matching its declared
/// capability; the other is left at its default, which reports
/// [`AdapterError::MissingField`] if the manager ever calls it by mistake.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used in priority lists, logs, and the `source`
    /// column of a persisted rate.
    fn name(&self) -> &'static str;

    /// The fetch shape this source implements.
    fn capability(&self) -> Capability;

    /// Whether this source needs the base currency's full display name
    /// (e.g. "US Dollar") to build its request URL.
    fn needs_base_name(&self) -> bool {
        false
    }

    /// Whether this source needs the base currency's plural display name
    /// (e.g. "US Dollars") to build its request URL.
    fn needs_base_plural(&self) -> bool {
        false
    }

    /// Fetch every available target rate in one request. Only implemented by
    /// [`Capability::MultiPair`] sources.
    async fn fetch_multi(
        &self,
        _ctx: &FetchContext<'_>,
    ) -> Result<BTreeMap<String, f64>, AdapterError> {
        Err(AdapterError::MissingField("multi-pair fetch not implemented for this source".into()))
    }

    /// Fetch a single target's rate. Only implemented by
    /// [`Capability::SinglePair`] sources.
    async fn fetch_single(
        &self,
        _ctx: &FetchContext<'_>,
        _target_currency: &str,
    ) -> Result<f64, AdapterError> {
        Err(AdapterError::MissingField("single-pair fetch not implemented for this source".into()))
    }
}
