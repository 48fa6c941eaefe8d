//! Strategy contract for supplier scraping
//!
//! One [`ScrapingStrategy`] implementation exists per supported supplier
//! site, parameterized by that site's selectors or structured-data layout.
//! Strategies wrap the fetch collaborator; the executor only ever talks to
//! this trait.

use async_trait::async_trait;

use crate::domain::errors::{FetchError, StrategyError};
use crate::domain::product::ProductRecord;
use crate::domain::scenario::CategoryRef;
use crate::domain::supplier::SupplierIdentity;

/// Product URLs enumerated from one category, possibly truncated.
///
/// A pagination failure after the first page keeps everything enumerated so
/// far and records the error here instead of discarding the partial result.
#[derive(Debug, Clone, Default)]
pub struct CategoryListing {
    pub product_urls: Vec<String>,
    pub pages_fetched: u32,
    pub truncated_by: Option<FetchError>,
}

impl CategoryListing {
    pub fn is_truncated(&self) -> bool {
        self.truncated_by.is_some()
    }

    pub fn len(&self) -> usize {
        self.product_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_urls.is_empty()
    }
}

/// Per-supplier scraping capability.
#[async_trait]
pub trait ScrapingStrategy: Send + Sync {
    /// Identity of the supplier this strategy scrapes.
    fn supplier(&self) -> &SupplierIdentity;

    /// Enumerate product URLs for a category, paginating internally.
    ///
    /// Finite and not restartable mid-sequence: re-invocation re-fetches
    /// from page 1. `Err` means the category itself could not be fetched;
    /// later-page failures truncate the listing instead.
    async fn list_category_products(
        &self,
        category: &CategoryRef,
    ) -> Result<CategoryListing, FetchError>;

    /// Fetch and normalize one product page.
    async fn fetch_product(&self, url: &str) -> Result<ProductRecord, StrategyError>;
}
