//! Wiring configuration into a ready policy manager

use std::sync::Arc;

use rulekit_application::{PolicyManager, shared_registry};
use rulekit_domain::{Error, Result, RunOptions};
use rulekit_providers::CommandScanner;
use rulekit_providers::constants::{CHECKOV_NAME, OPAL_NAME};

use crate::config::RulekitConfig;

/// Subprocess scanner using the configured tool commands
pub fn build_scanner(config: &RulekitConfig) -> CommandScanner {
    CommandScanner::new()
        .with_tool(CHECKOV_NAME, config.tools.checkov.clone())
        .with_tool(OPAL_NAME, config.tools.opal.clone())
}

/// Run options carrying the scanner and the configured extra arguments
pub fn build_run_options(config: &RulekitConfig) -> RunOptions {
    config.run.extra_args.iter().fold(
        RunOptions::new().with_scanner(Arc::new(build_scanner(config))),
        |options, arg| options.with_extra_arg(arg.clone()),
    )
}

/// Policy manager over every linked rule type
///
/// Fails when no rule type is linked into the binary.
pub fn build_manager(config: &RulekitConfig) -> Result<PolicyManager> {
    let registry = shared_registry();
    if registry.is_empty() {
        return Err(Error::configuration("no rule types are linked into this build"));
    }
    tracing::debug!(rule_types = ?registry.names(), "rule types available");

    let mut manager = PolicyManager::new(registry, build_run_options(config));
    if let Some(staging_dir) = &config.policy.staging_dir {
        manager = manager.with_staging_dir(staging_dir.clone());
    }
    Ok(manager)
}
