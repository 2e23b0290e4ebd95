//! Rule-type backend contract
//!
//! Every rule engine (YAML-based, Rego-based, ...) implements [`RuleType`] so
//! the policy manager can prepare, validate and test heterogeneous rules
//! through one protocol.

use std::path::Path;

use super::test_runner::{RunOptions, TestRunner};
use crate::entities::{Rule, Target};
use crate::error::Result;
use crate::value_objects::{Findings, PassFail, ValidateResult};

/// Engine-specific handling of one kind of rule
pub trait RuleType: Send + Sync {
    /// Stable name, also the rule-type directory name on disk
    fn name(&self) -> &'static str;

    /// Short code used in generated rule identifiers
    fn code(&self) -> &'static str;

    /// Targets this backend can evaluate
    fn supported_targets(&self) -> &'static [Target];

    /// Render every (rule, target) source into `destination` as
    /// `{target}-{rule_id}.{ext}`
    fn prepare_rules(&self, rules: &[&Rule], destination: &Path) -> Result<()>;

    /// Check every rule independently, never stopping at the first failure
    fn validate_rules(&self, options: &RunOptions, rules: &[&Rule]) -> ValidateResult;

    /// Build the fixture runner for one target
    fn test_runner(&self, options: &RunOptions, target: Target) -> Result<Box<dyn TestRunner>>;

    /// Reconcile a scan's findings against one rule
    fn find_rule_result(&self, findings: &Findings, rule_id: &str) -> PassFail;

    /// Whether `target` is one this backend supports
    fn supports(&self, target: Target) -> bool {
        self.supported_targets().contains(&target)
    }
}
