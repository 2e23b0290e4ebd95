//! Configuration loader
//!
//! Merges defaults, an optional TOML file and environment variables with
//! figment, then validates the result.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rulekit_domain::{Error, Result};
use rulekit_providers::ToolCommand;

use crate::config::types::RulekitConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    LOG_LEVELS,
};
use crate::error_ext::ErrorContext;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Explicit configuration file; must exist when set
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with the default environment prefix
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Load from `path` instead of searching the default locations
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read environment overrides from `{prefix}__...` variables
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate the configuration
    pub fn load(&self) -> Result<RulekitConfig> {
        let mut figment = Figment::from(Serialized::defaults(RulekitConfig::default()));

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(Error::configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Toml::file(path));
        } else if let Some(path) = Self::find_default_config_path() {
            tracing::debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Toml::file(path));
        }

        let env_prefix = format!("{}{}", self.env_prefix, CONFIG_ENV_SEPARATOR);
        figment = figment.merge(Env::prefixed(&env_prefix).split(CONFIG_ENV_SEPARATOR));

        let config: RulekitConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Configuration file this loader will read, if any
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(Self::find_default_config_path)
    }

    /// First existing default configuration file
    ///
    /// Searched in order: `./rulekit.toml`, `./rulekit/rulekit.toml`, the
    /// user config directory, then `~/.rulekit.toml`.
    fn find_default_config_path() -> Option<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std::env::current_dir() {
            candidates.push(current_dir.join(DEFAULT_CONFIG_FILENAME));
            candidates.push(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            );
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(
                config_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            );
        }
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(format!(".{DEFAULT_CONFIG_FILENAME}")));
        }

        candidates.into_iter().find(|path| path.exists())
    }

    /// Write `config` as pretty TOML
    pub fn save_to_file<P: AsRef<Path>>(config: &RulekitConfig, path: P) -> Result<()> {
        let content = render_toml(config)?;
        std::fs::write(path.as_ref(), content).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `config` as pretty TOML
pub fn render_toml(config: &RulekitConfig) -> Result<String> {
    toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")
}

fn validate_config(config: &RulekitConfig) -> Result<()> {
    validate_logging(config)?;
    validate_tool("checkov", &config.tools.checkov)?;
    validate_tool("opal", &config.tools.opal)?;
    Ok(())
}

fn validate_logging(config: &RulekitConfig) -> Result<()> {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(Error::configuration(format!(
            "Invalid log level '{}'. Use one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }
    Ok(())
}

fn validate_tool(name: &str, command: &ToolCommand) -> Result<()> {
    if command.program.trim().is_empty() {
        return Err(Error::configuration(format!(
            "tools.{name}.program cannot be empty"
        )));
    }
    Ok(())
}
