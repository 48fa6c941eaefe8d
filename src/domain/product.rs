//! Extracted product data
//!
//! A [`ProductRecord`] is the normalized result of scraping one page. It is
//! created by a strategy, persisted immediately, and never mutated after
//! that; the aggregation pass only reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::supplier::SupplierIdentity;

/// Kind of page a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Product,
    Category,
}

/// Normalized data for one scraped page.
///
/// `fields` is an open mapping of field name to value; a `BTreeMap` keeps
/// serialization order deterministic, which the aggregation output relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    pub supplier: SupplierIdentity,
    pub fields: BTreeMap<String, Value>,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
    #[serde(rename = "pageType")]
    pub page_type: PageType,
}

impl ProductRecord {
    pub fn new(source_url: &str, supplier: SupplierIdentity, page_type: PageType) -> Self {
        Self {
            source_url: source_url.to_string(),
            supplier,
            fields: BTreeMap::new(),
            fetched_at: Utc::now(),
            page_type,
        }
    }

    /// Set one extracted field, builder style.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field_str("title")
    }

    /// Numeric price, accepting either a JSON number or a numeric string.
    pub fn price(&self) -> Option<f64> {
        match self.fields.get("price")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Consolidated output of one aggregation run for one supplier.
///
/// Written as a whole, replacing any previous file for the supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSupplierFile {
    pub supplier: SupplierIdentity,
    pub records: Vec<ProductRecord>,
}
