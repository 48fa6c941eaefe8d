//! Parsing contexts
//!
//! Context objects carry the page provenance a parser needs: the URL the
//! document came from (for resolving relative links) and, for product
//! pages, the supplier the record belongs to.

use crate::domain::supplier::SupplierIdentity;

/// Context for parsing a category page.
#[derive(Debug, Clone)]
pub struct CategoryParseContext {
    /// URL of the category page being parsed
    pub page_url: String,
}

impl CategoryParseContext {
    pub fn new(page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
        }
    }
}

/// Context for parsing a product page.
#[derive(Debug, Clone)]
pub struct ProductParseContext {
    /// URL of the product page being parsed
    pub url: String,

    /// Supplier the resulting record belongs to
    pub supplier: SupplierIdentity,
}

impl ProductParseContext {
    pub fn new(url: &str, supplier: SupplierIdentity) -> Self {
        Self {
            url: url.to_string(),
            supplier,
        }
    }
}
