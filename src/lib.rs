//! supplier-harvest - Supplier product scraping and aggregation
//!
//! Scrapes product data from configured supplier sites scenario by
//! scenario, persists one JSON record per page, and consolidates the
//! results into one file per supplier in a separate aggregation pass.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the main pipeline types for easier access
pub use application::{AggregateReport, AggregationStage, ScenarioExecutor};
pub use domain::{
    ProductRecord, RunSummary, Scenario, ScrapingStrategy, SupplierIdentity,
};
pub use infrastructure::{AppConfig, ConfigManager, RecordStore, StrategyRegistry};
