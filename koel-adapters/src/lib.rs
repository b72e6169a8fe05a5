//! Concrete [`koel_core::SourceAdapter`] implementations for the ten sources
//! the orchestrator is allowed to scrape, plus the shared HTTP helpers they
//! all build on.

pub mod currency_converter;
pub mod exchange_rates_org;
pub mod forbes;
pub mod fx_empire;
pub mod hexarate;
pub mod http;
pub mod oanda;
pub mod trading_economics;
pub mod wise;
pub mod xe;
pub mod xrates;

use std::sync::Arc;

use koel_core::AdapterRegistry;

pub use currency_converter::CurrencyConverterAdapter;
pub use exchange_rates_org::ExchangeRatesOrgAdapter;
pub use forbes::ForbesAdapter;
pub use fx_empire::FxEmpireAdapter;
pub use hexarate::HexaRateAdapter;
pub use oanda::OandaAdapter;
pub use trading_economics::TradingEconomicsAdapter;
pub use wise::WiseAdapter;
pub use xe::XeAdapter;
pub use xrates::XRatesAdapter;

/// Build the registry with all ten known sources registered under the
/// default priority order. This is the registry every binary should start
/// from; callers that want a custom priority should clone its sources
/// into a fresh [`AdapterRegistry::new`] with `.with_priority(..)`.
#[must_use]
pub fn default_registry() -> AdapterRegistry {
    AdapterRegistry::new()
        .with_source(Arc::new(TradingEconomicsAdapter))
        .with_source(Arc::new(ExchangeRatesOrgAdapter))
        .with_source(Arc::new(CurrencyConverterAdapter))
        .with_source(Arc::new(XRatesAdapter))
        .with_source(Arc::new(ForbesAdapter))
        .with_source(Arc::new(HexaRateAdapter))
        .with_source(Arc::new(FxEmpireAdapter))
        .with_source(Arc::new(OandaAdapter))
        .with_source(Arc::new(WiseAdapter))
        .with_source(Arc::new(XeAdapter))
}
