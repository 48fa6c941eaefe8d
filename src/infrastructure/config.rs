//! Configuration infrastructure
//!
//! Configuration is a single JSON file managed by [`ConfigManager`]: loaded
//! at process start, created with defaults on first run, and passed by
//! reference to the components that need it. Nothing reads configuration
//! through a global.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::infrastructure::parsing::SelectorProfile;

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output locations for persisted records and aggregates
    pub output: OutputConfig,

    /// Fetch collaborator tuning
    pub fetch: FetchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Static supplier dispatch table, loaded once at startup
    pub suppliers: Vec<SupplierEntry>,
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one JSON file per scraped page
    pub records_dir: PathBuf,

    /// Directory receiving one JSON file per supplier after aggregation
    pub aggregates_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_dir: PathBuf::from("data/records"),
            aggregates_dir: PathBuf::from("data/aggregates"),
        }
    }
}

/// Tuning for the HTTP fetch collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Maximum attempts per request (1 = no retry)
    pub max_retries: u32,

    /// Delay between consecutive requests in milliseconds
    pub request_delay_ms: u64,

    /// User agent string
    pub user_agent: String,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Pagination cap per category
    pub max_category_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            max_retries: 3,
            request_delay_ms: 250,
            user_agent: "supplier-harvest/0.2 (data collection; contact: ops@localhost)"
                .to_string(),
            follow_redirects: true,
            max_category_pages: 50,
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files when file output is enabled
    pub log_dir: PathBuf,

    /// Module-specific log level filters (e.g. "reqwest": "warn")
    pub module_filters: std::collections::BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_filters = std::collections::BTreeMap::new();
        // These stay noisy well below our own debug level.
        module_filters.insert("hyper".to_string(), "warn".to_string());
        module_filters.insert("reqwest".to_string(), "warn".to_string());
        module_filters.insert("html5ever".to_string(), "error".to_string());
        module_filters.insert("selectors".to_string(), "error".to_string());

        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            module_filters,
        }
    }
}

/// Which strategy implementation serves a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    HtmlSelectors,
    JsonLd,
}

/// One row of the supplier dispatch table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierEntry {
    /// Supplier domain, e.g. "books.toscrape.com"
    pub domain: String,

    pub kind: StrategyKind,

    /// Selector profile; falls back to [`SelectorProfile::default`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<SelectorProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
            suppliers: default_suppliers(),
        }
    }
}

/// Built-in dispatch table: the scraping sandbox sites used as reference
/// suppliers. Real deployments replace these in the config file.
fn default_suppliers() -> Vec<SupplierEntry> {
    let books_profile = SelectorProfile {
        product_link: vec!["article.product_pod h3 a".to_string()],
        next_page: vec!["li.next a".to_string()],
        title: vec!["div.product_main h1".to_string()],
        price: vec!["div.product_main p.price_color".to_string()],
        images: vec!["div.item.active img".to_string()],
        description: vec!["#product_description ~ p".to_string()],
        ..SelectorProfile::default()
    };

    vec![
        SupplierEntry {
            domain: "books.toscrape.com".to_string(),
            kind: StrategyKind::HtmlSelectors,
            selectors: Some(books_profile),
        },
        SupplierEntry {
            domain: "webscraper.io".to_string(),
            kind: StrategyKind::JsonLd,
            selectors: None,
        },
    ]
}

/// Loads and saves the application configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager over the default per-user config location.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("supplier-harvest");

        Ok(Self {
            config_path: config_dir.join("config.json"),
        })
    }

    /// Manager over an explicit config file path.
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration, creating the file with defaults if it is missing.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "Configuration file not found, creating default: {:?}",
                self.config_path
            );
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse configuration file")?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file.
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Create the output directories a run will write into.
    pub async fn create_output_directories(&self, config: &AppConfig) -> Result<()> {
        for dir in [&config.output.records_dir, &config.output.aggregates_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create directory: {dir:?}"))?;
                info!("Created output directory: {:?}", dir);
            }
        }
        Ok(())
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_creates_default_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert!(manager.config_path().exists());
        assert_eq!(config.fetch.max_retries, 3);
        assert!(!config.suppliers.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.fetch.request_delay_ms = 1234;
        config.logging.level = "debug".to_string();
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.fetch.request_delay_ms, 1234);
        assert_eq!(loaded.logging.level, "debug");
    }

    #[test]
    fn default_dispatch_table_has_both_strategy_kinds() {
        let suppliers = default_suppliers();
        assert!(suppliers.iter().any(|s| s.kind == StrategyKind::HtmlSelectors));
        assert!(suppliers.iter().any(|s| s.kind == StrategyKind::JsonLd));
    }
}
