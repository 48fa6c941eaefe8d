//! Infrastructure layer for configuration, fetching, parsing and persistence
//!
//! This module provides the HTTP fetch collaborator, HTML parsing, the
//! per-supplier strategy implementations, the strategy registry, JSON-file
//! persistence, configuration management and logging setup.

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing; // Selector-driven parsing architecture
pub mod registry; // Supplier identity -> strategy dispatch
pub mod storage; // JSON-file persistence with atomic writes
pub mod strategies; // Concrete ScrapingStrategy implementations

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, FetchConfig, LoggingConfig, StrategyKind, SupplierEntry};
pub use http_client::{HttpClient, HttpClientConfig};
pub use parsing::{
    CategoryPage, CategoryPageParser, ContextualParser, ProductPageParser, SelectorProfile,
};
pub use registry::StrategyRegistry;
pub use storage::RecordStore;
pub use strategies::{HtmlSelectorStrategy, JsonLdStrategy};
