//! Category page parser
//!
//! Extracts product links and the next-page link from a category listing.
//! An empty page is a valid result, not an error; individual links that
//! cannot be resolved are logged and dropped.

use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::SelectorProfile;
use super::context::CategoryParseContext;
use super::{ContextualParser, compile_selectors, resolve_url};
use crate::domain::errors::ParseResult;

/// Links extracted from one category page.
#[derive(Debug, Clone, Default)]
pub struct CategoryPage {
    pub product_urls: Vec<String>,
    pub next_page: Option<String>,
}

/// Parser for product listing pages.
pub struct CategoryPageParser {
    product_link_selectors: Vec<Selector>,
    next_page_selectors: Vec<Selector>,
}

impl CategoryPageParser {
    pub fn from_profile(profile: &SelectorProfile) -> ParseResult<Self> {
        Ok(Self {
            product_link_selectors: compile_selectors(&profile.product_link)?,
            next_page_selectors: compile_selectors(&profile.next_page)?,
        })
    }
}

impl ContextualParser for CategoryPageParser {
    type Output = CategoryPage;
    type Context = CategoryParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output> {
        let mut product_urls = Vec::new();
        let mut seen = HashSet::new();

        // First selector that matches anything wins; the rest are fallbacks.
        for selector in &self.product_link_selectors {
            let elements: Vec<_> = html.select(selector).collect();
            if elements.is_empty() {
                continue;
            }

            for element in elements {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                match resolve_url(href, &context.page_url) {
                    Ok(resolved) => {
                        if seen.insert(resolved.clone()) {
                            product_urls.push(resolved);
                        }
                    }
                    Err(e) => warn!("Dropping unresolvable product link on {}: {}", context.page_url, e),
                }
            }
            break;
        }

        let next_page = self.extract_next_page(html, context);

        debug!(
            "Parsed category page {}: {} product links, next page: {}",
            context.page_url,
            product_urls.len(),
            next_page.as_deref().unwrap_or("none")
        );

        Ok(CategoryPage {
            product_urls,
            next_page,
        })
    }
}

impl CategoryPageParser {
    fn extract_next_page(&self, html: &Html, context: &CategoryParseContext) -> Option<String> {
        for selector in &self.next_page_selectors {
            if let Some(element) = html.select(selector).next() {
                if let Some(href) = element.value().attr("href") {
                    match resolve_url(href, &context.page_url) {
                        Ok(resolved) => return Some(resolved),
                        Err(e) => {
                            warn!("Unresolvable next-page link on {}: {}", context.page_url, e);
                        }
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <ul class="pagination"><li class="next"><a href="?page=3">next</a></li></ul>
          <div class="product-card"><a href="/product/1">One</a></div>
          <div class="product-card"><a href="/product/2">Two</a></div>
          <div class="product-card"><a href="/product/1">One again</a></div>
        </body></html>
    "#;

    fn parser() -> CategoryPageParser {
        CategoryPageParser::from_profile(&SelectorProfile::default()).unwrap()
    }

    #[test]
    fn extracts_resolved_deduplicated_links_and_next_page() {
        let html = Html::parse_document(LISTING);
        let context = CategoryParseContext::new("https://shop-a.com/cat/chairs?page=2");

        let page = parser().parse_with_context(&html, &context).unwrap();
        assert_eq!(
            page.product_urls,
            vec![
                "https://shop-a.com/product/1".to_string(),
                "https://shop-a.com/product/2".to_string(),
            ]
        );
        assert_eq!(
            page.next_page.as_deref(),
            Some("https://shop-a.com/cat/chairs?page=3")
        );
    }

    #[test]
    fn empty_page_is_valid_with_no_links() {
        let html = Html::parse_document("<html><body><p>Nothing here</p></body></html>");
        let context = CategoryParseContext::new("https://shop-a.com/cat/empty");

        let page = parser().parse_with_context(&html, &context).unwrap();
        assert!(page.product_urls.is_empty());
        assert!(page.next_page.is_none());
    }
}
