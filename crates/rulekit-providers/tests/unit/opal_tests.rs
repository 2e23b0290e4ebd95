//! Tests for the Rego (opal) backend and the shared fixture runner

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rulekit_domain::{
    Error, Finding, Findings, PassFail, Result, Rule, RuleType, RunOptions, ScanRequest, Scanner,
    Target,
};
use rulekit_providers::RegoRuleText;
use rulekit_providers::rule_types::OpalRuleType;

const POLICY: &str = "package rules.bucket\n\n__rego__metadoc__ := {\"title\": \"placeholder\"}\n\ndeny[msg] {\n  msg := \"public\"\n}\n";

fn rule_with(root: &Path, name: &str, targets: &[(Target, Option<&str>)]) -> Rule {
    let path = root.join("opal").join(name);
    let mut rule = Rule::new(format!("c-opl-{name}"), &path, "opal")
        .with_metadata("severity", "High")
        .with_metadata("title", "Buckets are private");
    for &(target, source) in targets {
        let dir = target.path(&rule);
        fs::create_dir_all(&dir).unwrap();
        if let Some(source) = source {
            fs::write(dir.join("policy.rego"), source).unwrap();
        }
        rule = rule.with_target(target);
    }
    rule
}

#[test]
fn test_prepare_rewrites_metadoc() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let rule = rule_with(
        src.path(),
        "bucket",
        &[(Target::Terraform, Some(POLICY)), (Target::Cloudformation, Some(POLICY))],
    );

    OpalRuleType::new().prepare_rules(&[&rule], dst.path()).unwrap();

    for target in ["terraform", "cloudformation"] {
        let file = dst.path().join(format!("{target}-c-opl-bucket.rego"));
        let text = RegoRuleText::read(&file).unwrap();
        assert_eq!(
            text.metadoc_keys().collect::<Vec<_>>(),
            vec!["sid", "severity", "title"]
        );
        assert_eq!(text.metadoc_value("sid"), Some("\"c-opl-bucket\""));
        assert_eq!(text.metadoc_value("title"), Some("\"Buckets are private\""));
        assert!(text.text().ends_with("deny[msg] {\n  msg := \"public\"\n}\n"));
    }
}

#[test]
fn test_prepare_fails_on_missing_source() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let rule = rule_with(src.path(), "empty", &[(Target::Terraform, None)]);

    let result = OpalRuleType::new().prepare_rules(&[&rule], dst.path());
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[test]
fn test_validate_collects_all_target_errors() {
    let src = tempfile::tempdir().unwrap();
    let good = rule_with(src.path(), "good", &[(Target::Kubernetes, Some(POLICY))]);
    let bad = rule_with(
        src.path(),
        "bad",
        &[
            (Target::Terraform, Some("allow { true }\n")),
            (Target::Helm, Some(POLICY)),
            (Target::Arm, None),
        ],
    );

    let result = OpalRuleType::new().validate_rules(&RunOptions::default(), &[&bad, &good]);

    assert_eq!((result.valid, result.invalid), (1, 1));
    let errors = result.errors().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| matches!(e, Error::Parse { .. })));
    assert!(errors.iter().any(|e| matches!(e, Error::UnsupportedTarget { .. })));
    assert!(errors.iter().any(|e| matches!(e, Error::NotFound { .. })));
}

/// Scanner returning canned findings and recording requests
struct RecordingScanner {
    findings: Findings,
    requests: Mutex<Vec<ScanRequest>>,
}

impl Scanner for RecordingScanner {
    fn scan(&self, request: &ScanRequest) -> Result<Findings> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.findings.clone())
    }
}

#[test]
fn test_runner_delegates_to_scanner() {
    let scanner = Arc::new(RecordingScanner {
        findings: vec![Finding::new("c-opl-bucket", false)].into(),
        requests: Mutex::new(Vec::new()),
    });
    let options = RunOptions::new()
        .with_scanner(scanner.clone())
        .with_extra_arg("--verbose");
    let backend = OpalRuleType::new();

    let runner = backend.test_runner(&options, Target::Kubernetes).unwrap();
    let findings = runner
        .run(Path::new("/fixtures/fail/open"), Path::new("/staging"))
        .unwrap();

    assert_eq!(backend.find_rule_result(&findings, "c-opl-bucket"), PassFail::Fail);
    assert_eq!(backend.find_rule_result(&findings, "c-opl-other"), PassFail::NotEvaluated);

    let requests = scanner.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tool, "opal");
    assert_eq!(requests[0].target, Target::Kubernetes);
    assert_eq!(requests[0].directory, PathBuf::from("/fixtures/fail/open"));
    assert_eq!(requests[0].rules_dir, Some(PathBuf::from("/staging")));
    assert_eq!(requests[0].extra_args, vec!["--verbose".to_string()]);
}

#[test]
fn test_runner_rejects_unsupported_target() {
    let scanner = Arc::new(RecordingScanner {
        findings: Findings::new(),
        requests: Mutex::new(Vec::new()),
    });
    let options = RunOptions::new().with_scanner(scanner);
    let runner = OpalRuleType::new().test_runner(&options, Target::Docker);
    assert!(runner.is_err());
}
