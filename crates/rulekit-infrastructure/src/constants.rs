//! Configuration and logging constants

/// Configuration file looked up in the working directory and config dirs
pub const DEFAULT_CONFIG_FILENAME: &str = "rulekit.toml";

/// Directory name used under the working directory and user config dir
pub const DEFAULT_CONFIG_DIR: &str = "rulekit";

/// Prefix of configuration environment variables
pub const CONFIG_ENV_PREFIX: &str = "RULEKIT";

/// Separator between prefix and nested keys (`RULEKIT__LOGGING__LEVEL`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Environment variable holding a tracing filter directive
pub const LOG_ENV_VAR: &str = "RULEKIT_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in configuration
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];
