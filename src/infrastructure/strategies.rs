//! Concrete scraping strategies
//!
//! Two implementations of [`ScrapingStrategy`] cover the supported
//! suppliers: [`HtmlSelectorStrategy`] drives everything through a selector
//! profile, [`JsonLdStrategy`] reads product data from embedded schema.org
//! JSON-LD while still using selectors for link discovery. Both paginate
//! categories the same way, so the loop is shared.
//!
//! `scraper::Html` is not `Send`; fetched bodies are parsed inside a
//! non-async scope so no document is ever held across an await point.

use async_trait::async_trait;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::domain::errors::{FetchError, StrategyError};
use crate::domain::product::ProductRecord;
use crate::domain::scenario::CategoryRef;
use crate::domain::services::{CategoryListing, ScrapingStrategy};
use crate::domain::supplier::SupplierIdentity;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::{
    CategoryPage, CategoryPageParser, CategoryParseContext, ContextualParser, JsonLdExtractor,
    ProductPageParser, ProductParseContext, SelectorProfile,
};

/// Turn a scenario category into the URL of its first page.
fn first_page_url(category: &CategoryRef, profile: &SelectorProfile) -> Result<String, FetchError> {
    match category {
        CategoryRef::Url(url) => Ok(url.clone()),
        CategoryRef::Query(query) => profile.search_url_for(query).ok_or_else(|| {
            FetchError::invalid_request(query, "supplier has no search URL template")
        }),
    }
}

/// Follow next-page links from `start_url`, collecting product URLs.
///
/// A failure on the first page propagates; a failure on a later page
/// truncates the listing and keeps what was already enumerated. The page
/// cap and a visited-set bound the walk on suppliers with circular
/// pagination.
async fn paginate_category(
    http: &HttpClient,
    parser: &CategoryPageParser,
    start_url: String,
    max_pages: u32,
) -> Result<CategoryListing, FetchError> {
    let mut listing = CategoryListing::default();
    let mut seen_urls = HashSet::new();
    let mut visited_pages = HashSet::new();
    let mut next_url = Some(start_url);

    while let Some(page_url) = next_url.take() {
        if listing.pages_fetched >= max_pages || !visited_pages.insert(page_url.clone()) {
            break;
        }

        let body = match http.fetch_html_string(&page_url).await {
            Ok(body) => body,
            Err(e) if listing.pages_fetched == 0 => return Err(e),
            Err(e) => {
                warn!("Pagination aborted at {}: {}", page_url, e);
                listing.truncated_by = Some(e);
                break;
            }
        };

        let page: CategoryPage = {
            let html = Html::parse_document(&body);
            let context = CategoryParseContext::new(&page_url);
            match parser.parse_with_context(&html, &context) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Failed to parse category page {}: {}", page_url, e);
                    CategoryPage::default()
                }
            }
        };

        listing.pages_fetched += 1;
        for url in page.product_urls {
            if seen_urls.insert(url.clone()) {
                listing.product_urls.push(url);
            }
        }
        next_url = page.next_page;
    }

    debug!(
        "Enumerated {} product URLs over {} pages",
        listing.len(),
        listing.pages_fetched
    );
    Ok(listing)
}

/// Selector-profile-driven strategy: both link discovery and field
/// extraction come from the supplier's CSS selectors.
pub struct HtmlSelectorStrategy {
    supplier: SupplierIdentity,
    http: HttpClient,
    profile: SelectorProfile,
    category_parser: CategoryPageParser,
    product_parser: ProductPageParser,
    max_pages: u32,
}

impl HtmlSelectorStrategy {
    pub fn new(
        supplier: SupplierIdentity,
        profile: SelectorProfile,
        http: HttpClient,
        max_pages: u32,
    ) -> Result<Self, StrategyError> {
        Ok(Self {
            category_parser: CategoryPageParser::from_profile(&profile)?,
            product_parser: ProductPageParser::from_profile(&profile)?,
            supplier,
            http,
            profile,
            max_pages,
        })
    }
}

#[async_trait]
impl ScrapingStrategy for HtmlSelectorStrategy {
    fn supplier(&self) -> &SupplierIdentity {
        &self.supplier
    }

    async fn list_category_products(
        &self,
        category: &CategoryRef,
    ) -> Result<CategoryListing, FetchError> {
        let start = first_page_url(category, &self.profile)?;
        paginate_category(&self.http, &self.category_parser, start, self.max_pages).await
    }

    async fn fetch_product(&self, url: &str) -> Result<ProductRecord, StrategyError> {
        let body = self.http.fetch_html_string(url).await?;

        let record = {
            let html = Html::parse_document(&body);
            let context = ProductParseContext::new(url, self.supplier.clone());
            self.product_parser.parse_with_context(&html, &context)?
        };

        Ok(record)
    }
}

/// Strategy for suppliers that embed schema.org JSON-LD on product pages.
pub struct JsonLdStrategy {
    supplier: SupplierIdentity,
    http: HttpClient,
    profile: SelectorProfile,
    category_parser: CategoryPageParser,
    extractor: JsonLdExtractor,
    max_pages: u32,
}

impl JsonLdStrategy {
    pub fn new(
        supplier: SupplierIdentity,
        profile: SelectorProfile,
        http: HttpClient,
        max_pages: u32,
    ) -> Result<Self, StrategyError> {
        Ok(Self {
            category_parser: CategoryPageParser::from_profile(&profile)?,
            extractor: JsonLdExtractor::new(),
            supplier,
            http,
            profile,
            max_pages,
        })
    }
}

#[async_trait]
impl ScrapingStrategy for JsonLdStrategy {
    fn supplier(&self) -> &SupplierIdentity {
        &self.supplier
    }

    async fn list_category_products(
        &self,
        category: &CategoryRef,
    ) -> Result<CategoryListing, FetchError> {
        let start = first_page_url(category, &self.profile)?;
        paginate_category(&self.http, &self.category_parser, start, self.max_pages).await
    }

    async fn fetch_product(&self, url: &str) -> Result<ProductRecord, StrategyError> {
        let body = self.http.fetch_html_string(url).await?;

        let record = {
            let html = Html::parse_document(&body);
            let context = ProductParseContext::new(url, self.supplier.clone());
            self.extractor.extract(&html, &context)?
        };

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_category_passes_through() {
        let profile = SelectorProfile::default();
        let category = CategoryRef::Url("https://shop-a.com/cat/chairs".to_string());
        assert_eq!(
            first_page_url(&category, &profile).unwrap(),
            "https://shop-a.com/cat/chairs"
        );
    }

    #[test]
    fn query_category_without_template_is_rejected() {
        let profile = SelectorProfile::default();
        let category = CategoryRef::Query("garden chairs".to_string());
        let err = first_page_url(&category, &profile).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest { .. }));
    }

    #[test]
    fn query_category_uses_search_template() {
        let profile = SelectorProfile {
            search_url: Some("https://shop-a.com/search?q={query}".to_string()),
            ..SelectorProfile::default()
        };
        let category = CategoryRef::Query("garden chairs".to_string());
        assert_eq!(
            first_page_url(&category, &profile).unwrap(),
            "https://shop-a.com/search?q=garden+chairs"
        );
    }
}
