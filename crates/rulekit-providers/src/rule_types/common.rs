//! Behaviour shared by every rule-type backend

use std::path::Path;
use std::sync::Arc;

use rulekit_domain::{
    Error, Findings, MultiError, PassFail, Result, Rule, RuleType, RunOptions, ScanRequest,
    Scanner, Target, TestRunner, ValidateResult,
};

/// Deterministic rendered filename `{target}-{rule_id}.{ext}`
pub fn rendered_file_name(target: Target, rule_id: &str, extension: &str) -> String {
    format!("{target}-{rule_id}.{extension}")
}

/// Fail with `UnsupportedTarget` when `backend` cannot evaluate `target`
pub fn validate_supported_target(
    backend: &dyn RuleType,
    rule: &Rule,
    target: Target,
) -> Result<()> {
    if backend.supports(target) {
        Ok(())
    } else {
        Err(Error::UnsupportedTarget {
            rule_id: rule.id().to_string(),
            target: target.to_string(),
            rule_type: backend.name().to_string(),
        })
    }
}

/// Validate each rule independently with `check`, run once per target
///
/// A rule with any failing target counts as one invalid rule; every target
/// error is kept.
pub fn validate_each<F>(backend: &dyn RuleType, rules: &[&Rule], check: F) -> ValidateResult
where
    F: Fn(&Rule, Target) -> Result<()>,
{
    let mut result = ValidateResult::new();
    for &rule in rules {
        let mut errors = MultiError::new();
        for &target in &rule.targets {
            if let Err(e) = validate_supported_target(backend, rule, target) {
                errors.push(e);
                continue;
            }
            if let Err(e) = check(rule, target) {
                errors.push(e);
            }
        }

        let mut errors = errors.into_iter();
        match errors.next() {
            None => result.record_valid(),
            Some(first) => {
                tracing::debug!(rule_id = rule.id(), error = %first, "rule is invalid");
                result.record_invalid(first);
                errors.for_each(|e| result.append_error(e));
            }
        }
    }
    result
}

/// Reconcile findings against one rule
///
/// Any failing finding wins over passing ones; no finding at all means the
/// rule was not evaluated.
pub fn find_rule_result(findings: &Findings, rule_id: &str) -> PassFail {
    let mut result = PassFail::NotEvaluated;
    for finding in findings.for_rule(rule_id) {
        if !finding.pass {
            return PassFail::Fail;
        }
        result = PassFail::Pass;
    }
    result
}

/// Fixture runner evaluating rendered rules with the configured scanner
///
/// The same [`Scanner`] performs production scans, so fixture results
/// reflect real evaluation.
pub struct ToolTestRunner {
    tool: &'static str,
    target: Target,
    scanner: Arc<dyn Scanner>,
    extra_args: Vec<String>,
}

impl ToolTestRunner {
    /// Build the runner for `target`, checking support and scanner presence
    pub fn for_backend(
        backend: &dyn RuleType,
        options: &RunOptions,
        target: Target,
    ) -> Result<Box<dyn TestRunner>> {
        if !backend.supports(target) {
            return Err(Error::configuration(format!(
                "the {} rule type cannot run {target} fixtures",
                backend.name()
            )));
        }
        let scanner = options.scanner.clone().ok_or_else(|| {
            Error::configuration(format!("no scanner configured for {}", backend.name()))
        })?;
        Ok(Box::new(Self {
            tool: backend.name(),
            target,
            scanner,
            extra_args: options.extra_args.clone(),
        }))
    }
}

impl TestRunner for ToolTestRunner {
    fn run(&self, fixture: &Path, rules_dir: &Path) -> Result<Findings> {
        let request = ScanRequest {
            tool: self.tool.to_string(),
            target: self.target,
            directory: fixture.to_path_buf(),
            rules_dir: Some(rules_dir.to_path_buf()),
            extra_args: self.extra_args.clone(),
        };
        tracing::debug!(
            tool = self.tool,
            target = %self.target,
            fixture = %fixture.display(),
            "running fixture scan"
        );
        self.scanner.scan(&request)
    }
}
