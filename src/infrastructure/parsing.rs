//! Selector-driven HTML parsing
//!
//! Parsers are compiled once from a supplier's [`SelectorProfile`] and run
//! against fetched documents. Every selector slot is a fallback list: the
//! first selector that produces elements wins, later ones are only tried
//! when earlier ones match nothing.

pub mod category_parser;
pub mod config;
pub mod context;
pub mod json_ld;
pub mod product_parser;

// Re-export public types
pub use category_parser::{CategoryPage, CategoryPageParser};
pub use config::SelectorProfile;
pub use context::{CategoryParseContext, ProductParseContext};
pub use json_ld::JsonLdExtractor;
pub use product_parser::ProductPageParser;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::domain::errors::{ParseError, ParseResult};

/// Parser over a fetched document with contextual information.
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information.
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output>;
}

/// Compile a fallback list of selector strings.
///
/// Individually broken selectors are logged and dropped; the list only
/// fails as a whole when every entry was broken.
pub(crate) fn compile_selectors(selector_strings: &[String]) -> ParseResult<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile selector '{}': {}", selector_str, e);
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() && !selector_strings.is_empty() {
        return Err(ParseError::invalid_selector(
            &selector_strings.join(", "),
            &format!("no valid selectors compiled: {}", errors.join(", ")),
        ));
    }

    if !errors.is_empty() {
        debug!("Some selectors failed to compile: {}", errors.join(", "));
    }

    Ok(selectors)
}

/// Resolve an href against the page it appeared on.
pub(crate) fn resolve_url(href: &str, base_url: &str) -> ParseResult<String> {
    let base = Url::parse(base_url).map_err(|e| {
        ParseError::url_resolution(href, &format!("invalid base URL: {e}"), Some(base_url))
    })?;

    let joined = base
        .join(href)
        .map_err(|e| ParseError::url_resolution(href, &e.to_string(), Some(base_url)))?;

    Ok(joined.to_string())
}

/// First non-empty text content produced by a fallback selector list.
pub(crate) fn extract_text_with_fallbacks(html: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| extract_text_by_selector(html, selector))
}

fn extract_text_by_selector(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
