//! Configuration types

use std::path::PathBuf;

use rulekit_providers::ToolCommand;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_LEVEL;

/// Top-level rulekit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulekitConfig {
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
    pub tools: ToolsConfig,
    pub run: RunConfig,
}

/// Where policies live and where rules are staged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Policy root or any path inside it; the working directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Parent directory for staging directories; the system temp dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}

/// External scanner commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub checkov: ToolCommand,
    pub opal: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            checkov: ToolCommand::checkov(),
            opal: ToolCommand::opal(),
        }
    }
}

/// Options applied to every scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub extra_args: Vec<String>,
}
