use std::sync::Arc;

use koel_types::Capability;

use crate::adapter::SourceAdapter;

/// The ten sources known to the system, in the order the failsafe sweep
/// tries them by default. Callers may override this priority (e.g. to
/// deprioritize a source known to be flaky).
pub const DEFAULT_PRIORITY: [&str; 10] = [
    "trading-economics",
    "exchange-rates-org-uk",
    "currency-converter-org-uk",
    "x-rates",
    "forbes",
    "hexa-rate",
    "fx_empire",
    "oanda",
    "wise",
    "xe",
];

/// A registered source and the adapter that implements it.
#[derive(Clone)]
pub struct SourceDescriptor {
    pub name: &'static str,
    pub capability: Capability,
    pub needs_base_name: bool,
    pub needs_base_plural: bool,
    pub adapter: Arc<dyn SourceAdapter>,
}

impl SourceDescriptor {
    #[must_use]
    pub fn new(adapter: Arc<dyn SourceAdapter>) -> Self {
        Self {
            name: adapter.name(),
            capability: adapter.capability(),
            needs_base_name: adapter.needs_base_name(),
            needs_base_plural: adapter.needs_base_plural(),
            adapter,
        }
    }
}

/// Holds every registered source plus the priority order the manager walks
/// when attempting a failsafe scrape.
pub struct AdapterRegistry {
    sources: Vec<SourceDescriptor>,
    priority: Vec<String>,
}

impl AdapterRegistry {
    /// Build an empty registry using the default ten-source priority order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            priority: DEFAULT_PRIORITY.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Override the priority order. Sources not present here are never
    /// attempted, and names with no registered adapter are silently skipped.
    #[must_use]
    pub fn with_priority(mut self, priority: Vec<String>) -> Self {
        self.priority = priority;
        self
    }

    /// Register a source adapter.
    #[must_use]
    pub fn with_source(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.sources.push(SourceDescriptor::new(adapter));
        self
    }

    /// Iterate registered sources in priority order, skipping any priority
    /// entry with no matching registration.
    pub fn ordered(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.priority.iter().filter_map(|name| {
            self.sources.iter().find(|d| d.name == name.as_str())
        })
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::adapter::FetchContext;
    use crate::error::AdapterError;
    use std::collections::BTreeMap;

    struct StubAdapter {
        name: &'static str,
        capability: Capability,
    }

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn capability(&self) -> Capability {
            self.capability
        }

        async fn fetch_multi(
            &self,
            _ctx: &FetchContext<'_>,
        ) -> Result<BTreeMap<String, f64>, AdapterError> {
            Ok(BTreeMap::new())
        }
    }

    #[test]
    fn ordered_respects_priority_and_skips_unregistered() {
        let registry = AdapterRegistry::new()
            .with_priority(vec!["xe".to_string(), "trading-economics".to_string()])
            .with_source(Arc::new(StubAdapter {
                name: "trading-economics",
                capability: Capability::MultiPair,
            }))
            .with_source(Arc::new(StubAdapter {
                name: "xe",
                capability: Capability::SinglePair,
            }));

        let names: Vec<&str> = registry.ordered().map(|d| d.name).collect();
        assert_eq!(names, vec!["xe", "trading-economics"]);
    }

    #[test]
    fn ordered_skips_priority_entries_with_no_registration() {
        let registry = AdapterRegistry::new()
            .with_priority(vec!["ghost".to_string(), "xe".to_string()])
            .with_source(Arc::new(StubAdapter {
                name: "xe",
                capability: Capability::SinglePair,
            }));

        let names: Vec<&str> = registry.ordered().map(|d| d.name).collect();
        assert_eq!(names, vec!["xe"]);
    }
}
