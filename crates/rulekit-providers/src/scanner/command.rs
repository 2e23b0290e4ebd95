//! Subprocess scanner
//!
//! Runs an external tool per scan request and parses its JSON report. The
//! exit status is only logged: scanners exit non-zero whenever a check
//! fails, so the report is the source of truth.

use std::collections::BTreeMap;
use std::process::Command;

use rulekit_domain::{Error, Findings, Result, ScanRequest, Scanner};
use serde::{Deserialize, Serialize};

use super::parsers::parse_report;
use crate::constants::{CHECKOV_NAME, OPAL_NAME};

/// Program and argument template of one tool
///
/// Arguments may contain `{dir}`, `{rules_dir}` and `{target}`
/// placeholders. `{rules_dir}` expands to an empty string when the request
/// carries no rules directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Default checkov invocation: JSON report with external checks
    pub fn checkov() -> Self {
        Self::new(
            CHECKOV_NAME,
            ["-d", "{dir}", "--external-checks-dir", "{rules_dir}", "-o", "json"],
        )
    }

    /// Default opal invocation: only the custom rules, JSON report
    pub fn opal() -> Self {
        Self::new(
            OPAL_NAME,
            [
                "run",
                "--format",
                "json",
                "--no-default-rules",
                "--include",
                "{rules_dir}",
                "{dir}",
            ],
        )
    }

    /// Template arguments expanded for `request`, followed by its extra args
    pub fn expand(&self, request: &ScanRequest) -> Vec<String> {
        let dir = request.directory.display().to_string();
        let rules_dir = request
            .rules_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let target = request.target.to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{dir}", &dir)
                    .replace("{rules_dir}", &rules_dir)
                    .replace("{target}", &target)
            })
            .chain(request.extra_args.iter().cloned())
            .collect()
    }
}

/// [`Scanner`] running one configured command per tool
#[derive(Debug, Clone, Default)]
pub struct CommandScanner {
    tools: BTreeMap<String, ToolCommand>,
}

impl CommandScanner {
    /// Create a scanner with no tools configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with the default checkov and opal commands
    pub fn with_defaults() -> Self {
        Self::new()
            .with_tool(CHECKOV_NAME, ToolCommand::checkov())
            .with_tool(OPAL_NAME, ToolCommand::opal())
    }

    /// Configure (or replace) the command for `tool`
    pub fn with_tool(mut self, tool: impl Into<String>, command: ToolCommand) -> Self {
        self.tools.insert(tool.into(), command);
        self
    }

    pub fn command(&self, tool: &str) -> Option<&ToolCommand> {
        self.tools.get(tool)
    }
}

impl Scanner for CommandScanner {
    fn scan(&self, request: &ScanRequest) -> Result<Findings> {
        let command = self.tools.get(&request.tool).ok_or_else(|| {
            Error::configuration(format!("no command configured for tool '{}'", request.tool))
        })?;
        let args = command.expand(request);

        tracing::debug!(
            tool = %request.tool,
            program = %command.program,
            ?args,
            "running scanner"
        );
        let output = Command::new(&command.program)
            .args(&args)
            .output()
            .map_err(|e| Error::io_with_source(format!("running {}", command.program), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(
            tool = %request.tool,
            status = %output.status,
            stdout_bytes = output.stdout.len(),
            "scanner finished"
        );

        parse_report(&request.tool, &stdout).map_err(|message| Error::Scan {
            tool: request.tool.clone(),
            message,
            stderr: stderr.trim().to_string(),
        })
    }
}
