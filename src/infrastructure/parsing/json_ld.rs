//! JSON-LD product extraction
//!
//! Suppliers that embed schema.org structured data don't need a selector
//! profile for fields: the `Product` object in a `ld+json` script block
//! already carries them. Selectors still drive link discovery; this module
//! only handles the product page itself.

use scraper::{Html, Selector};
use serde_json::{Value, json};
use tracing::debug;

use super::context::ProductParseContext;
use crate::domain::errors::{ParseError, ParseResult};
use crate::domain::product::{PageType, ProductRecord};

/// Extractor for schema.org `Product` JSON-LD blocks.
pub struct JsonLdExtractor {
    script_selector: Selector,
}

impl JsonLdExtractor {
    pub fn new() -> Self {
        Self {
            script_selector: Selector::parse("script[type=\"application/ld+json\"]")
                .expect("ld+json selector is valid"),
        }
    }

    /// Extract the first `Product` object found in the page's JSON-LD.
    pub fn extract(&self, html: &Html, context: &ProductParseContext) -> ParseResult<ProductRecord> {
        let product = html
            .select(&self.script_selector)
            .filter_map(|element| {
                let json_text = element.text().collect::<String>();
                serde_json::from_str::<Value>(&json_text).ok()
            })
            .find_map(find_product_object)
            .ok_or_else(|| {
                ParseError::structured_data(&context.url, "no Product object in JSON-LD")
            })?;

        let title = product
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::required_field_missing("title", Some("JSON-LD Product")))?;

        let mut record = ProductRecord::new(&context.url, context.supplier.clone(), PageType::Product)
            .with_field("title", title);

        if let Some(price) = extract_offer_price(&product) {
            record = record.with_field("price", price);
        }

        let images = extract_images(&product);
        if !images.is_empty() {
            record = record.with_field("images", Value::Array(images));
        }

        if let Some(description) = product.get("description").and_then(Value::as_str) {
            record = record.with_field("description", description.trim());
        }

        if let Some(brand) = extract_brand(&product) {
            record = record.with_field("brand", brand);
        }

        if let Some(sku) = product.get("sku").and_then(Value::as_str) {
            record = record.with_field("sku", sku);
        }

        debug!(
            "Extracted JSON-LD product from {} with {} fields",
            context.url,
            record.fields.len()
        );

        Ok(record)
    }
}

impl Default for JsonLdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Find a `@type: Product` object directly, in a top-level array, or in a
/// `@graph` collection.
fn find_product_object(parsed: Value) -> Option<Value> {
    fn is_product(value: &Value) -> bool {
        match value.get("@type") {
            Some(Value::String(t)) => t == "Product",
            Some(Value::Array(types)) => types.iter().any(|t| t == "Product"),
            _ => false,
        }
    }

    if is_product(&parsed) {
        return Some(parsed);
    }

    if let Value::Array(items) = &parsed {
        return items.iter().find(|item| is_product(item)).cloned();
    }

    if let Some(Value::Array(graph)) = parsed.get("@graph") {
        return graph.iter().find(|item| is_product(item)).cloned();
    }

    None
}

/// Price from `offers`, which may be a single offer or a list.
fn extract_offer_price(product: &Value) -> Option<Value> {
    let offers = product.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };

    match offer.get("price")? {
        Value::Number(n) => Some(json!(n)),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(parsed) => Some(json!(parsed)),
            Err(_) => Some(json!(s)),
        },
        _ => None,
    }
}

/// `image` may be a string, an array, or an ImageObject.
fn extract_images(product: &Value) -> Vec<Value> {
    match product.get("image") {
        Some(Value::String(s)) => vec![json!(s)],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(json!(s)),
                Value::Object(_) => item.get("url").cloned(),
                _ => None,
            })
            .collect(),
        Some(Value::Object(_)) => product
            .get("image")
            .and_then(|obj| obj.get("url"))
            .cloned()
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn extract_brand(product: &Value) -> Option<String> {
    match product.get("brand")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(String::from),
        _ => None,
    }
}
