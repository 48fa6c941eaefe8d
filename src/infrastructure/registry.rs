//! Supplier dispatch
//!
//! Maps a supplier identity to its scraping strategy. The table is built
//! once at process start from the configured dispatch entries (plus any
//! explicitly registered strategies, which is how tests inject scripted
//! ones) and never changes afterwards.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::RegistryError;
use crate::domain::services::ScrapingStrategy;
use crate::domain::supplier::SupplierIdentity;
use crate::infrastructure::config::{AppConfig, StrategyKind};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::strategies::{HtmlSelectorStrategy, JsonLdStrategy};

/// Identity -> strategy lookup table.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<SupplierIdentity, Arc<dyn ScrapingStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the configured dispatch table.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::from_fetch_config(&config.fetch)?;
        let max_pages = config.fetch.max_category_pages;

        let mut registry = Self::new();
        for entry in &config.suppliers {
            let supplier = SupplierIdentity::from_host(&entry.domain);
            let profile = entry.selectors.clone().unwrap_or_default();

            let strategy: Arc<dyn ScrapingStrategy> = match entry.kind {
                StrategyKind::HtmlSelectors => Arc::new(
                    HtmlSelectorStrategy::new(supplier, profile, http.clone(), max_pages)
                        .with_context(|| {
                            format!("Invalid selector profile for supplier '{}'", entry.domain)
                        })?,
                ),
                StrategyKind::JsonLd => Arc::new(
                    JsonLdStrategy::new(supplier, profile, http.clone(), max_pages).with_context(
                        || format!("Invalid selector profile for supplier '{}'", entry.domain),
                    )?,
                ),
            };
            registry.register(strategy);
        }

        info!(
            "Strategy registry initialized with {} suppliers",
            registry.len()
        );
        Ok(registry)
    }

    /// Register one strategy under its own supplier identity. Later
    /// registrations for the same identity replace earlier ones.
    pub fn register(&mut self, strategy: Arc<dyn ScrapingStrategy>) {
        self.strategies.insert(strategy.supplier().clone(), strategy);
    }

    /// Resolve the strategy for any absolute URL of a supplier site.
    pub fn resolve(&self, url: &str) -> Result<Arc<dyn ScrapingStrategy>, RegistryError> {
        let identity = SupplierIdentity::from_url(url)?;
        self.resolve_identity(&identity)
    }

    /// Resolve by an already-derived identity.
    pub fn resolve_identity(
        &self,
        identity: &SupplierIdentity,
    ) -> Result<Arc<dyn ScrapingStrategy>, RegistryError> {
        self.strategies
            .get(identity)
            .cloned()
            .ok_or_else(|| RegistryError::unsupported(identity.as_str()))
    }

    pub fn suppliers(&self) -> Vec<&SupplierIdentity> {
        let mut suppliers: Vec<_> = self.strategies.keys().collect();
        suppliers.sort();
        suppliers
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StrategyRegistry {
        StrategyRegistry::from_config(&AppConfig::default()).unwrap()
    }

    #[test]
    fn resolves_configured_supplier_for_any_of_its_urls() {
        let registry = registry();

        let a = registry
            .resolve("https://books.toscrape.com/catalogue/category/books/travel_2/index.html")
            .unwrap();
        let b = registry.resolve("http://www.books.toscrape.com/").unwrap();
        assert_eq!(a.supplier(), b.supplier());
        assert_eq!(a.supplier().as_str(), "books.toscrape.com");
    }

    #[test]
    fn unknown_supplier_is_unsupported() {
        let err = registry()
            .resolve("https://unknown-shop.example/cat/1")
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnsupportedSupplier { .. }));
    }

    #[test]
    fn invalid_url_is_not_an_unsupported_supplier() {
        let err = registry().resolve("not a url").err().unwrap();
        assert!(matches!(err, RegistryError::InvalidUrl { .. }));
    }

    #[test]
    fn suppliers_are_listed_sorted() {
        let registry = registry();
        let suppliers = registry.suppliers();
        assert_eq!(suppliers.len(), 2);
        assert!(suppliers.windows(2).all(|w| w[0] <= w[1]));
    }
}
