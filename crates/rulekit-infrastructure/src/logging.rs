//! Structured logging with tracing
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RULEKIT_LOG` takes precedence over the configured level.

use rulekit_domain::{Error, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::config::LoggingConfig;
use crate::constants::LOG_ENV_VAR;

/// Initialize the global subscriber
///
/// Fails with a configuration error for an unknown level or when a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let registry = Registry::default().with(filter);
    let installed = if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
    installed.map_err(|e| Error::Configuration {
        message: format!("Failed to install log subscriber: {e}"),
        source: Some(Box::new(e)),
    })?;

    tracing::debug!(%level, json = config.json_format, "logging initialized");
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Map `-v` repetitions onto a level, starting from `base`
pub fn verbosity_level(base: &str, verbose: u8) -> String {
    let level = match verbose {
        0 => return base.to_string(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    level.as_str().to_lowercase()
}
