//! YAML rule-type backend (checkov custom policies)
//!
//! A rule body is a YAML document at `<target>/rule.yaml`. Preparation sets
//! `metadata.id` and `metadata.name` and re-serializes the document.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rulekit_application::registry::{RULE_TYPES, RuleTypeEntry};
use rulekit_domain::{
    Error, Findings, PassFail, Result, Rule, RuleType, RunOptions, Target, TestRunner,
    ValidateResult,
};
use serde_yaml::{Mapping, Value};

use super::common::{
    ToolTestRunner, find_rule_result, rendered_file_name, validate_each,
    validate_supported_target,
};
use crate::constants::{CHECKOV_CODE, CHECKOV_NAME, YAML_RULE_FILE};

const SUPPORTED_TARGETS: &[Target] = &[
    Target::Terraform,
    Target::Cloudformation,
    Target::Kubernetes,
    Target::Helm,
    Target::Arm,
    Target::Docker,
];

/// Checkov YAML rules
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckovRuleType;

impl CheckovRuleType {
    pub fn new() -> Self {
        Self
    }

    /// Parse `<target>/rule.yaml`; `None` when the target has no rule body
    fn read_rule(rule: &Rule, target: Target) -> Result<Option<Mapping>> {
        let path = target.path(rule).join(YAML_RULE_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_yaml::from_str::<Value>(&content) {
            Ok(Value::Mapping(body)) => Ok(Some(body)),
            Ok(_) => Err(Error::parse(&path, "rule body must be a YAML mapping")),
            Err(e) => Err(Error::parse(&path, format!("not legal YAML: {e}"))),
        }
    }

    /// Rule body with identity injected, serialized
    fn render(rule: &Rule, target: Target) -> Result<Option<String>> {
        let Some(mut body) = Self::read_rule(rule, target)? else {
            return Ok(None);
        };
        generic_set(&mut body, &["metadata", "id"], Value::from(rule.id()));
        generic_set(&mut body, &["metadata", "name"], Value::from(rule.title()));
        serde_yaml::to_string(&body)
            .map(Some)
            .map_err(|e| Error::parse(&rule.path, format!("serializing rule body: {e}")))
    }
}

/// Set `value` at the nested `path`, creating or replacing intermediate mappings
pub fn generic_set(body: &mut Mapping, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = body;
    for &segment in parents {
        let key = Value::from(segment);
        let slot = current
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(Value::from(*last), value);
}

impl RuleType for CheckovRuleType {
    fn name(&self) -> &'static str {
        CHECKOV_NAME
    }

    fn code(&self) -> &'static str {
        CHECKOV_CODE
    }

    fn supported_targets(&self) -> &'static [Target] {
        SUPPORTED_TARGETS
    }

    fn prepare_rules(&self, rules: &[&Rule], destination: &Path) -> Result<()> {
        for &rule in rules {
            for &target in &rule.targets {
                validate_supported_target(self, rule, target)?;
                let Some(rendered) = Self::render(rule, target)? else {
                    tracing::debug!(rule_id = rule.id(), %target, "no rule body, skipping");
                    continue;
                };
                let file = destination.join(rendered_file_name(target, rule.id(), "yaml"));
                fs::write(&file, rendered)?;
                tracing::debug!(
                    rule_id = rule.id(),
                    %target,
                    file = %file.display(),
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
static CHECKOV_RULE_TYPE: RuleTypeEntry = RuleTypeEntry {
    name: CHECKOV_NAME,
    description: "Checkov custom policies written in YAML",
    factory: || Arc::new(CheckovRuleType::new()),
};
