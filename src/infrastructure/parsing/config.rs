//! Per-supplier selector profiles
//!
//! A profile parameterizes the generic strategies with one supplier's DOM
//! shape. Each slot is an ordered fallback list; the defaults are the
//! conventions common enough to be worth trying on any shop.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CSS selectors describing one supplier's page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorProfile {
    /// Links to product pages on a category page
    pub product_link: Vec<String>,

    /// Link to the next category page, when the supplier paginates
    pub next_page: Vec<String>,

    pub title: Vec<String>,
    pub price: Vec<String>,
    pub images: Vec<String>,
    pub description: Vec<String>,

    /// Supplier-specific extra fields, by output field name
    pub extra_fields: BTreeMap<String, Vec<String>>,

    /// Search URL template with a `{query}` placeholder, for query-style
    /// scenario categories
    pub search_url: Option<String>,
}

impl Default for SelectorProfile {
    fn default() -> Self {
        Self {
            product_link: vec![
                "a.product-link".to_string(),
                ".product-card a".to_string(),
                ".product-item a".to_string(),
                "li.product a".to_string(),
            ],
            next_page: vec![
                "a[rel=\"next\"]".to_string(),
                "li.next a".to_string(),
                ".pagination a.next".to_string(),
            ],
            title: vec![
                "h1[itemprop=\"name\"]".to_string(),
                "h1.product-title".to_string(),
                "h1".to_string(),
            ],
            price: vec![
                "[itemprop=\"price\"]".to_string(),
                ".product-price".to_string(),
                ".price".to_string(),
            ],
            images: vec![
                "img[itemprop=\"image\"]".to_string(),
                ".product-gallery img".to_string(),
                "img.product-image".to_string(),
            ],
            description: vec![
                "[itemprop=\"description\"]".to_string(),
                ".product-description".to_string(),
                "#description".to_string(),
            ],
            extra_fields: BTreeMap::new(),
            search_url: None,
        }
    }
}

impl SelectorProfile {
    /// Build the category URL for a free-text query, when the supplier has
    /// a search template.
    pub fn search_url_for(&self, query: &str) -> Option<String> {
        self.search_url.as_ref().map(|template| {
            template.replace(
                "{query}",
                &url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_has_every_slot_populated() {
        let profile = SelectorProfile::default();
        assert!(!profile.product_link.is_empty());
        assert!(!profile.next_page.is_empty());
        assert!(!profile.title.is_empty());
        assert!(!profile.price.is_empty());
    }

    #[test]
    fn search_url_substitutes_and_encodes_query() {
        let profile = SelectorProfile {
            search_url: Some("https://shop-a.com/search?q={query}".to_string()),
            ..SelectorProfile::default()
        };
        assert_eq!(
            profile.search_url_for("garden chairs").unwrap(),
            "https://shop-a.com/search?q=garden+chairs"
        );
        assert!(SelectorProfile::default().search_url_for("x").is_none());
    }

    #[test]
    fn partial_profile_deserializes_over_defaults() {
        let profile: SelectorProfile =
            serde_json::from_str(r#"{"title": ["h2.name"]}"#).unwrap();
        assert_eq!(profile.title, vec!["h2.name".to_string()]);
        assert!(!profile.product_link.is_empty());
    }
}
