//! Configuration wiring tests

use std::path::PathBuf;

use rulekit_infrastructure::{RulekitConfig, build_manager, build_run_options, build_scanner};
use rulekit_providers::ToolCommand;

#[test]
fn test_scanner_uses_configured_commands() {
    let mut config = RulekitConfig::default();
    config.tools.opal = ToolCommand::new("/usr/local/bin/opal", ["run", "{dir}"]);

    let scanner = build_scanner(&config);

    assert_eq!(scanner.command("checkov"), Some(&ToolCommand::checkov()));
    assert_eq!(
        scanner.command("opal").map(|c| c.program.as_str()),
        Some("/usr/local/bin/opal")
    );
    assert!(scanner.command("tfsec").is_none());
}

#[test]
fn test_run_options_carry_extra_args() {
    let mut config = RulekitConfig::default();
    config.run.extra_args = vec!["--quiet".to_string(), "--compact".to_string()];

    let options = build_run_options(&config);

    assert!(options.scanner.is_some());
    assert_eq!(options.extra_args, vec!["--quiet", "--compact"]);
}

#[test]
fn test_build_manager_links_rule_types() {
    let mut config = RulekitConfig::default();
    config.policy.staging_dir = Some(PathBuf::from("/tmp"));

    let manager = build_manager(&config).expect("manager");

    assert!(manager.options().scanner.is_some());
    assert!(manager.policy_dir().is_none());
    assert!(manager.rules().is_empty());
}
