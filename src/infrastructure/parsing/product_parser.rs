//! Product page parser
//!
//! Normalizes one product page into a [`ProductRecord`]. The title is the
//! only required field; everything else is extracted best-effort so a
//! sparse page still yields a usable record.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Value, json};
use tracing::debug;

use super::config::SelectorProfile;
use super::context::ProductParseContext;
use super::{ContextualParser, compile_selectors, extract_text_with_fallbacks, resolve_url};
use crate::domain::errors::{ParseError, ParseResult};
use crate::domain::product::{PageType, ProductRecord};

/// Parser for product detail pages.
pub struct ProductPageParser {
    title_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    image_selectors: Vec<Selector>,
    description_selectors: Vec<Selector>,
    extra_fields: Vec<(String, Vec<Selector>)>,
    price_pattern: Regex,
}

impl ProductPageParser {
    pub fn from_profile(profile: &SelectorProfile) -> ParseResult<Self> {
        let mut extra_fields = Vec::new();
        for (name, selectors) in &profile.extra_fields {
            extra_fields.push((name.clone(), compile_selectors(selectors)?));
        }

        Ok(Self {
            title_selectors: compile_selectors(&profile.title)?,
            price_selectors: compile_selectors(&profile.price)?,
            image_selectors: compile_selectors(&profile.images)?,
            description_selectors: compile_selectors(&profile.description)?,
            extra_fields,
            price_pattern: Regex::new(r"\d+(?:[.,]\d{1,2})?").expect("price pattern is valid"),
        })
    }

    /// Pull the first number out of a price string, tolerating a decimal
    /// comma. Currency symbols and thousands noise around it are ignored.
    fn normalize_price(&self, raw: &str) -> Option<f64> {
        let matched = self.price_pattern.find(raw)?;
        matched.as_str().replace(',', ".").parse().ok()
    }

    fn extract_images(&self, html: &Html, context: &ProductParseContext) -> Vec<Value> {
        for selector in &self.image_selectors {
            let sources: Vec<Value> = html
                .select(selector)
                .filter_map(|e| e.value().attr("src").or_else(|| e.value().attr("data-src")))
                .filter_map(|src| resolve_url(src, &context.url).ok())
                .map(Value::String)
                .collect();
            if !sources.is_empty() {
                return sources;
            }
        }
        Vec::new()
    }
}

impl ContextualParser for ProductPageParser {
    type Output = ProductRecord;
    type Context = ProductParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output> {
        let title = extract_text_with_fallbacks(html, &self.title_selectors)
            .ok_or_else(|| ParseError::required_field_missing("title", Some("product page")))?;

        let mut record = ProductRecord::new(&context.url, context.supplier.clone(), PageType::Product)
            .with_field("title", title);

        if let Some(price_text) = extract_text_with_fallbacks(html, &self.price_selectors) {
            match self.normalize_price(&price_text) {
                Some(price) => record = record.with_field("price", price),
                // Keep the raw text rather than losing the field entirely.
                None => record = record.with_field("price", price_text),
            }
        }

        let images = self.extract_images(html, context);
        if !images.is_empty() {
            record = record.with_field("images", Value::Array(images));
        }

        if let Some(description) = extract_text_with_fallbacks(html, &self.description_selectors) {
            record = record.with_field("description", description);
        }

        for (name, selectors) in &self.extra_fields {
            if let Some(text) = extract_text_with_fallbacks(html, selectors) {
                record = record.with_field(name, json!(text));
            }
        }

        debug!(
            "Parsed product page {} into {} fields",
            context.url,
            record.fields.len()
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::supplier::SupplierIdentity;

    const PRODUCT: &str = r#"
        <html><body>
          <h1 class="product-title">Oak chair</h1>
          <span class="product-price">€ 129,50</span>
          <div class="product-gallery">
            <img src="/media/chair-front.jpg">
            <img src="/media/chair-side.jpg">
          </div>
          <div class="product-description">Solid oak, oiled finish.</div>
        </body></html>
    "#;

    fn context() -> ProductParseContext {
        ProductParseContext::new(
            "https://shop-a.com/product/42",
            SupplierIdentity::from_host("shop-a.com"),
        )
    }

    fn parser() -> ProductPageParser {
        ProductPageParser::from_profile(&SelectorProfile::default()).unwrap()
    }

    #[test]
    fn extracts_normalized_record() {
        let html = Html::parse_document(PRODUCT);
        let record = parser().parse_with_context(&html, &context()).unwrap();

        assert_eq!(record.title(), Some("Oak chair"));
        assert_eq!(record.price(), Some(129.50));
        assert_eq!(record.field_str("description"), Some("Solid oak, oiled finish."));
        assert_eq!(
            record.fields["images"],
            json!([
                "https://shop-a.com/media/chair-front.jpg",
                "https://shop-a.com/media/chair-side.jpg"
            ])
        );
        assert_eq!(record.page_type, PageType::Product);
        assert_eq!(record.supplier.as_str(), "shop-a.com");
    }

    #[test]
    fn missing_title_is_a_parse_error() {
        let html = Html::parse_document("<html><body><span class=\"price\">1</span></body></html>");
        let err = parser().parse_with_context(&html, &context()).unwrap_err();
        assert!(matches!(err, ParseError::RequiredFieldMissing { ref field, .. } if field == "title"));
    }

    #[test]
    fn unparseable_price_keeps_raw_text() {
        let html = Html::parse_document(
            "<html><body><h1>Chair</h1><span class=\"price\">call us</span></body></html>",
        );
        let record = parser().parse_with_context(&html, &context()).unwrap();
        assert_eq!(record.field_str("price"), Some("call us"));
        assert_eq!(record.price(), None);
    }

    #[test]
    fn price_normalization_handles_common_formats() {
        let parser = parser();
        assert_eq!(parser.normalize_price("$ 1299.99"), Some(1299.99));
        assert_eq!(parser.normalize_price("129,50 zł"), Some(129.50));
        assert_eq!(parser.normalize_price("from 49"), Some(49.0));
        assert_eq!(parser.normalize_price("sold out"), None);
    }
}
