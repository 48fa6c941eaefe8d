//! Logging system configuration and initialization
//!
//! Console and optional file output through `tracing`. The caller keeps the
//! returned guard alive for the lifetime of the process; dropping it flushes
//! and closes the non-blocking file writer.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

/// Initialize the logging system.
///
/// `RUST_LOG` overrides the configured level and module filters when set.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_env_filter(config)?;

    let console_layer = config
        .console_output
        .then(|| fmt::layer().with_target(true));

    let (file_layer, guard) = if config.file_output {
        std::fs::create_dir_all(&config.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, "supplier-harvest.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(guard)
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = config.level.clone();
    for (module, level) in &config.module_filters {
        directives.push_str(&format!(",{module}={level}"));
    }

    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {directives}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_builds_from_config_directives() {
        let config = LoggingConfig::default();
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "l=oud=est".to_string(),
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_err());
    }
}
