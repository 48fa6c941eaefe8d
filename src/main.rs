//! CLI driver for the scraping pipeline
//!
//! Two subcommands: `run` executes a scenario file against the configured
//! suppliers, `aggregate` consolidates persisted records per supplier.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::{info, warn};

use supplier_harvest::application::{AggregationStage, ScenarioExecutor};
use supplier_harvest::domain::Scenario;
use supplier_harvest::infrastructure::logging::init_logging;
use supplier_harvest::infrastructure::{ConfigManager, RecordStore, StrategyRegistry};

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  supplier-harvest [--config <path>] run <scenarios.json>");
    eprintln!("  supplier-harvest [--config <path>] aggregate [<records-dir>] [<out-dir>]");
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            if i + 1 >= args.len() {
                print_usage();
                bail!("--config requires a path");
            }
            args.remove(i);
            Some(PathBuf::from(args.remove(i)))
        }
        None => None,
    };

    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config().await?;

    let _log_guard = init_logging(&config.logging)?;

    match args.first().map(String::as_str) {
        Some("run") => {
            let Some(scenarios_path) = args.get(1) else {
                print_usage();
                bail!("run requires a scenario file");
            };

            let scenarios = load_scenarios(scenarios_path).await?;
            manager.create_output_directories(&config).await?;

            let registry = StrategyRegistry::from_config(&config)?;
            let store = RecordStore::new(&config.output.records_dir);
            store
                .ensure_dir()
                .await
                .context("Failed to create records directory")?;

            let executor = ScenarioExecutor::new(registry, store);
            let summary = executor.run(&scenarios).await;

            if summary.scenarios_failed() > 0 {
                warn!(
                    "{} of {} scenarios failed",
                    summary.scenarios_failed(),
                    summary.outcomes.len()
                );
            }
        }
        Some("aggregate") => {
            let source_dir = args
                .get(1)
                .map(PathBuf::from)
                .unwrap_or_else(|| config.output.records_dir.clone());
            let output_dir = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| config.output.aggregates_dir.clone());

            let stage = AggregationStage::new(output_dir);
            let report = stage
                .aggregate(&source_dir)
                .await
                .context("Aggregation pass failed")?;

            for (supplier, count) in &report.written {
                info!("{}: {} records", supplier, count);
            }
            if report.files_skipped > 0 {
                warn!("{} files skipped", report.files_skipped);
            }
            info!(
                "Aggregation complete: {} suppliers, {} files skipped",
                report.written.len(),
                report.files_skipped
            );
        }
        _ => {
            print_usage();
            bail!("expected a subcommand: run | aggregate");
        }
    }

    Ok(())
}

/// Load the ordered scenario list. A malformed file is a startup error.
async fn load_scenarios(path: &str) -> Result<Vec<Scenario>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scenario file: {path}"))?;

    let scenarios: Vec<Scenario> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {path}"))?;

    if scenarios.is_empty() {
        warn!("Scenario file {} is empty; nothing to do", path);
    }
    Ok(scenarios)
}
