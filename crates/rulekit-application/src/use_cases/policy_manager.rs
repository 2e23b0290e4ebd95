//! Policy Manager Use Case
//!
//! Ties discovery, validation, fixture testing and packaging together.
//! Every loop is sequential: one rule, one target, one fixture at a time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rulekit_domain::constants::{FAIL_FIXTURES_DIR, PASS_FIXTURES_DIR};
use rulekit_domain::{
    Error, PassFail, PolicyUploader, Result, Rule, RuleType, RunOptions, Target, TestCase,
    TestMetrics, TestRunner, UploadRequest, ValidateResult,
};
use tempfile::TempDir;

use super::discovery::{discover_rules, find_policy_root, resolve_hint};
use super::tarball::write_tarball;
use crate::registry::RuleTypeRegistry;

/// Prefix of every staging directory the manager creates
const STAGING_PREFIX: &str = "rulekit-";

/// Orchestrates one invocation over a policy set
///
/// Owns the loaded rules and the result counters for the duration of a
/// command. Staging directories are scoped to the operation that creates
/// them and removed on every exit path.
#[derive(Debug)]
pub struct PolicyManager {
    registry: Arc<RuleTypeRegistry>,
    options: RunOptions,
    staging_dir: Option<PathBuf>,
    policy_dir: Option<PathBuf>,
    rules: Vec<Rule>,
}

impl PolicyManager {
    /// Create a manager resolving backends through `registry`
    pub fn new(registry: Arc<RuleTypeRegistry>, options: RunOptions) -> Self {
        Self {
            registry,
            options,
            staging_dir: None,
            policy_dir: None,
            rules: Vec::new(),
        }
    }

    /// Create staging directories under `dir` instead of the system temp dir
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn policy_dir(&self) -> Option<&Path> {
        self.policy_dir.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Locate the policy root
    ///
    /// With a hint, the hint (or its parent, when it is the `policies`
    /// directory) must be the root. Without one, the working directory and
    /// its ancestors are searched.
    pub fn detect_policy(&mut self, hint: Option<&Path>) -> Result<&Path> {
        let root = match hint {
            Some(hint) => resolve_hint(hint).ok_or_else(|| {
                Error::not_found(format!("policy directory at {}", hint.display()))
            })?,
            None => {
                let cwd = std::env::current_dir()?;
                find_policy_root(&cwd).ok_or_else(|| {
                    Error::not_found(format!(
                        "policy directory in {} or any parent",
                        cwd.display()
                    ))
                })?
            }
        };
        tracing::info!(policy_dir = %root.display(), "detected policy directory");
        Ok(self.policy_dir.insert(root).as_path())
    }

    /// Discover every rule under the detected policy root
    ///
    /// Valid rules are kept even when other directories fail; the failures
    /// are then returned together as `Discovery`. Returns the number of
    /// rules loaded.
    pub fn load_rules(&mut self) -> Result<usize> {
        let root = self
            .policy_dir
            .as_deref()
            .ok_or_else(|| Error::not_found("policy directory (not detected)"))?;

        let discovered = discover_rules(root, &self.registry)?;
        self.rules = discovered.rules;
        tracing::info!(
            rules = self.rules.len(),
            errors = discovered.errors.len(),
            "loaded rules"
        );

        match discovered.errors.into_option() {
            Some(errors) => Err(Error::Discovery(errors)),
            None => Ok(self.rules.len()),
        }
    }

    /// Validate every loaded rule through its backend
    ///
    /// Never partial: all groups are validated and their results merged.
    pub fn validate_rules(&self) -> ValidateResult {
        let mut result = ValidateResult::new();
        for (rule_type, rules) in self.groups() {
            let group = match self.registry.get(rule_type) {
                Some(backend) => backend.validate_rules(&self.options, &rules),
                None => unregistered_result(rule_type, &rules),
            };
            tracing::debug!(
                rule_type,
                valid = group.valid,
                invalid = group.invalid,
                "validated rule group"
            );
            result.merge(group);
        }
        tracing::info!(valid = result.valid, invalid = result.invalid, "validated rules");
        result
    }

    /// Run every fixture of every (rule, target) pair
    ///
    /// Failures to prepare, to build a runner or to run are recorded per
    /// fixture and never stop the matrix. Fails with `TestsFailed` carrying
    /// the complete metrics when anything failed.
    pub fn test_rules(&self) -> Result<TestMetrics> {
        let mut metrics = TestMetrics::new();
        for (rule_type, rules) in self.groups() {
            let backend = self.registry.get(rule_type);
            for rule in rules {
                self.test_rule(backend.as_deref(), rule, &mut metrics);
            }
        }
        tracing::info!(
            passed = metrics.passed,
            failed = metrics.failed,
            "finished rule tests"
        );
        metrics.into_result()
    }

    fn test_rule(&self, backend: Option<&dyn RuleType>, rule: &Rule, metrics: &mut TestMetrics) {
        let staged = backend
            .ok_or_else(|| {
                Error::rule_directory(
                    &rule.path,
                    format!("unregistered rule type '{}'", rule.rule_type),
                )
            })
            .and_then(|backend| self.stage(backend, rule).map(|dir| (backend, dir)));

        for &target in &rule.targets {
            let fixtures = match collect_fixtures(rule, target) {
                Ok(fixtures) => fixtures,
                Err(e) => {
                    let tests = target.tests_path(rule);
                    metrics.record(failed_case(rule, target, tests, PassFail::Pass, &e));
                    continue;
                }
            };
            if fixtures.is_empty() {
                tracing::debug!(rule_id = rule.id(), %target, "no fixtures");
                continue;
            }

            let runner = match &staged {
                Ok((backend, _)) => backend.test_runner(&self.options, target),
                Err(e) => Err(Error::TestExecution {
                    rule_id: rule.id().to_string(),
                    target: target.to_string(),
                    fixture: target.tests_path(rule),
                    message: format!("preparing rule: {e}"),
                }),
            };

            for (fixture, expected) in fixtures {
                let case = match (&staged, &runner) {
                    (Ok((backend, dir)), Ok(runner)) => {
                        let run = FixtureRun {
                            rule,
                            target,
                            expected,
                            rules_dir: dir.path(),
                        };
                        run.execute(*backend, runner.as_ref(), fixture)
                    }
                    (_, Err(e)) | (Err(e), _) => failed_case(rule, target, fixture, expected, e),
                };
                if !case.passed() {
                    tracing::warn!(
                        rule_id = rule.id(),
                        %target,
                        fixture = %case.fixture.display(),
                        expected = %case.expected,
                        error = case.error.as_deref().unwrap_or(""),
                        "rule test failed"
                    );
                }
                metrics.record(case);
            }
        }
    }

    /// Render one rule into a fresh staging directory
    fn stage(&self, backend: &dyn RuleType, rule: &Rule) -> Result<TempDir> {
        let dir = self.staging()?;
        backend.prepare_rules(&[rule], dir.path())?;
        Ok(dir)
    }

    /// Render all rules and archive them into `destination`
    ///
    /// All-or-nothing: on any failure the staging directory is removed and
    /// `destination` is not created.
    pub fn create_tarball(&self, destination: &Path) -> Result<()> {
        let staging = self
            .staging()
            .map_err(|e| Error::packaging("creating staging directory", e))?;

        for (rule_type, rules) in self.groups() {
            let backend = self.registry.get(rule_type).ok_or_else(|| {
                Error::packaging(
                    format!("{rule_type}: resolving backend"),
                    Error::not_found(format!("rule type '{rule_type}'")),
                )
            })?;
            backend.prepare_rules(&rules, staging.path()).map_err(|e| {
                Error::packaging(format!("{rule_type}: preparing {} rules", rules.len()), e)
            })?;
            tracing::debug!(rule_type, rules = rules.len(), "prepared rule group");
        }

        write_tarball(staging.path(), destination).map_err(|e| {
            Error::packaging(format!("archiving into {}", destination.display()), e)
        })?;
        tracing::info!(
            destination = %destination.display(),
            rules = self.rules.len(),
            "created policy tarball"
        );
        Ok(())
    }

    /// Validate, package into `destination` and hand the tarball to `uploader`
    pub fn package_and_upload(
        &self,
        uploader: &dyn PolicyUploader,
        destination: &Path,
        organization: &str,
    ) -> Result<()> {
        let policy_dir = self
            .policy_dir
            .clone()
            .ok_or_else(|| Error::not_found("policy directory (not detected)"))?;

        self.validate_rules().into_result()?;
        self.create_tarball(destination)?;

        let request = UploadRequest {
            tarball: destination.to_path_buf(),
            organization: organization.to_string(),
            policy_dir,
        };
        uploader.upload(&request)?;
        tracing::info!(organization, tarball = %destination.display(), "uploaded policy tarball");
        Ok(())
    }

    /// Loaded rules grouped by rule type, in name order
    fn groups(&self) -> BTreeMap<&str, Vec<&Rule>> {
        let mut groups: BTreeMap<&str, Vec<&Rule>> = BTreeMap::new();
        for rule in &self.rules {
            groups.entry(rule.rule_type.as_str()).or_default().push(rule);
        }
        groups
    }

    fn staging(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match &self.staging_dir {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// Pass and fail fixtures of one target, each sorted by name
///
/// Hidden entries such as `.gitkeep` are not fixtures.
fn collect_fixtures(rule: &Rule, target: Target) -> Result<Vec<(PathBuf, PassFail)>> {
    let tests = target.tests_path(rule);
    let mut fixtures = Vec::new();
    for (dir, expected) in [
        (PASS_FIXTURES_DIR, PassFail::Pass),
        (FAIL_FIXTURES_DIR, PassFail::Fail),
    ] {
        let dir = tests.join(dir);
        if !dir.is_dir() {
            continue;
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            entries.push(entry.path());
        }
        entries.sort();
        fixtures.extend(entries.into_iter().map(|path| (path, expected)));
    }
    Ok(fixtures)
}

/// Context shared by every fixture of one (rule, target) pair
struct FixtureRun<'a> {
    rule: &'a Rule,
    target: Target,
    expected: PassFail,
    rules_dir: &'a Path,
}

impl FixtureRun<'_> {
    fn execute(
        &self,
        backend: &dyn RuleType,
        runner: &dyn TestRunner,
        fixture: PathBuf,
    ) -> TestCase {
        match runner.run(&fixture, self.rules_dir) {
            Ok(findings) => TestCase {
                rule_id: self.rule.id().to_string(),
                target: self.target,
                fixture,
                expected: self.expected,
                actual: Some(backend.find_rule_result(&findings, self.rule.id())),
                error: None,
            },
            Err(e) => failed_case(self.rule, self.target, fixture, self.expected, &e),
        }
    }
}

fn failed_case(
    rule: &Rule,
    target: Target,
    fixture: PathBuf,
    expected: PassFail,
    error: &Error,
) -> TestCase {
    TestCase {
        rule_id: rule.id().to_string(),
        target,
        fixture,
        expected,
        actual: None,
        error: Some(error.to_string()),
    }
}

fn unregistered_result(rule_type: &str, rules: &[&Rule]) -> ValidateResult {
    let mut result = ValidateResult::new();
    for rule in rules {
        result.record_invalid(Error::rule_directory(
            &rule.path,
            format!("unregistered rule type '{rule_type}'"),
        ));
    }
    result
}
