//! Rego rule-type backend (opal custom rules)
//!
//! A rule body is `<target>/policy.rego`. Preparation rewrites its
//! `__rego__metadoc__` literal with the rule identifier and metadata.

use std::path::Path;
use std::sync::Arc;

use rulekit_application::registry::{RULE_TYPES, RuleTypeEntry};
use rulekit_domain::{
    Error, Findings, PassFail, Result, Rule, RuleType, RunOptions, Target, TestRunner,
    ValidateResult,
};

use super::common::{
    ToolTestRunner, find_rule_result, rendered_file_name, validate_each,
    validate_supported_target,
};
use crate::constants::{OPAL_CODE, OPAL_NAME, REGO_RULE_FILE};
use crate::rego::RegoRuleText;

const SUPPORTED_TARGETS: &[Target] = &[
    Target::Terraform,
    Target::TerraformPlan,
    Target::Cloudformation,
    Target::Kubernetes,
    Target::Arm,
];

/// Metadata keys emitted right after `sid`, in this order
const LEADING_KEYS: &[&str] = &["severity", "title"];

/// Opal Rego rules
#[derive(Debug, Default, Clone, Copy)]
pub struct OpalRuleType;

impl OpalRuleType {
    pub fn new() -> Self {
        Self
    }

    fn read_rule(rule: &Rule, target: Target) -> Result<RegoRuleText> {
        let path = target.path(rule).join(REGO_RULE_FILE);
        if !path.is_file() {
            return Err(Error::not_found(format!("rule source {}", path.display())));
        }
        RegoRuleText::read(&path)
    }
}

/// Metadata overrides for `rule`: `sid`, then severity and title, then the
/// rest of the rule metadata in key order
pub fn metadoc_overrides(rule: &Rule) -> Vec<(&str, &str)> {
    let mut overrides = vec![("sid", rule.id())];
    for &key in LEADING_KEYS {
        if let Some(value) = rule.metadata.get(key) {
            overrides.push((key, value.as_str()));
        }
    }
    overrides.extend(
        rule.metadata
            .iter()
            .filter(|(k, _)| k.as_str() != "sid" && !LEADING_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    overrides
}

impl RuleType for OpalRuleType {
    fn name(&self) -> &'static str {
        OPAL_NAME
    }

    fn code(&self) -> &'static str {
        OPAL_CODE
    }

    fn supported_targets(&self) -> &'static [Target] {
        SUPPORTED_TARGETS
    }

    fn prepare_rules(&self, rules: &[&Rule], destination: &Path) -> Result<()> {
        for &rule in rules {
            let overrides = metadoc_overrides(rule);
            for &target in &rule.targets {
                validate_supported_target(self, rule, target)?;
                let text = Self::read_rule(rule, target)?;
                let file = destination.join(rendered_file_name(target, rule.id(), "rego"));
                text.write_file(&file, &overrides)?;
                tracing::debug!(
                    rule_id = rule.id(),
                    %target,
                    package = text.package_name(),
                    "prepared rule"
                );
            }
        }
        Ok(())
    }

    fn validate_rules(&self, _options: &RunOptions, rules: &[&Rule]) -> ValidateResult {
        validate_each(self, rules, |rule, target| {
            Self::read_rule(rule, target).map(drop)
        })
    }

    fn test_runner(&self, options: &RunOptions, target: Target) -> Result<Box<dyn TestRunner>> {
        ToolTestRunner::for_backend(self, options, target)
    }

    fn find_rule_result(&self, findings: &Findings, rule_id: &str) -> PassFail {
        find_rule_result(findings, rule_id)
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

#[linkme::distributed_slice(RULE_TYPES)]
static OPAL_RULE_TYPE: RuleTypeEntry = RuleTypeEntry {
    name: OPAL_NAME,
    description: "Opal custom rules written in Rego",
    factory: || Arc::new(OpalRuleType::new()),
};
