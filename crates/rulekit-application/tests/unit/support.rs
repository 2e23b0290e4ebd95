//! Shared fixtures: on-disk policy trees and fake collaborators

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rulekit_domain::{
    Error, Finding, Findings, PolicyUploader, Result, ScanRequest, Scanner, UploadRequest,
};

pub const POLICY: &str = "package rules.bucket\n\n__rego__metadoc__ := {\"title\": \"placeholder\"}\n\ndeny[msg] {\n  msg := \"public\"\n}\n";

pub const CHECKOV_RULE: &str = "metadata:\n  category: GENERAL_SECURITY\ndefinition:\n  cond_type: attribute\n";

/// Builder for a `<root>/policies/...` tree in a temp directory
pub struct PolicyTree {
    pub dir: tempfile::TempDir,
}

impl PolicyTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("policies")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn rule_dir(&self, rule_type: &str, name: &str) -> PathBuf {
        self.root().join("policies").join(rule_type).join(name)
    }

    /// Rule directory with metadata and no targets
    pub fn rule(&self, rule_type: &str, name: &str, metadata: &str) -> PathBuf {
        let dir = self.rule_dir(rule_type, name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("metadata.yaml"), metadata).unwrap();
        dir
    }

    /// Opal rule with one terraform target
    pub fn opal_rule(&self, name: &str, source: &str) -> PathBuf {
        let dir = self.rule("opal", name, "title: Buckets are private\nseverity: High\n");
        write(&dir.join("terraform/policy.rego"), source);
        dir
    }

    /// Checkov rule with one terraform target
    pub fn checkov_rule(&self, name: &str, body: &str) -> PathBuf {
        let dir = self.rule("checkov", name, "title: Checked\n");
        write(&dir.join("terraform/rule.yaml"), body);
        dir
    }

    /// Fixture directory `<target>/tests/<pass|fail>/<name>/main.tf`
    pub fn fixture(&self, rule_dir: &Path, target: &str, kind: &str, name: &str, content: &str) {
        write(
            &rule_dir
                .join(target)
                .join("tests")
                .join(kind)
                .join(name)
                .join("main.tf"),
            content,
        );
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Evaluates every staged rule: fails inputs mentioning `public-read`
///
/// Rule ids are recovered from the staged `{target}-{rule_id}.{ext}` names.
#[derive(Default)]
pub struct FakeScanner {
    pub requests: Mutex<Vec<ScanRequest>>,
    pub broken_fixture: Option<String>,
}

impl Scanner for FakeScanner {
    fn scan(&self, request: &ScanRequest) -> Result<Findings> {
        self.requests.lock().unwrap().push(request.clone());
        let fixture = request.directory.display().to_string();
        if self
            .broken_fixture
            .as_deref()
            .is_some_and(|broken| fixture.contains(broken))
        {
            return Err(Error::Scan {
                tool: request.tool.clone(),
                message: "report was not JSON".into(),
                stderr: "boom".into(),
            });
        }

        let input = fs::read_to_string(request.directory.join("main.tf")).unwrap_or_default();
        let pass = !input.contains("public-read");
        let prefix = format!("{}-", request.target);

        let rules_dir = request.rules_dir.as_ref().expect("rules dir");
        let mut findings = Findings::new();
        for entry in fs::read_dir(rules_dir).unwrap() {
            let name = entry.unwrap().file_name().into_string().unwrap();
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let rule_id = rest.rsplit_once('.').map_or(rest, |(id, _)| id);
            findings.push(Finding::new(rule_id, pass));
        }
        Ok(findings)
    }
}

/// Records upload requests, optionally failing
#[derive(Default)]
pub struct FakeUploader {
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub fail: bool,
}

impl PolicyUploader for FakeUploader {
    fn upload(&self, request: &UploadRequest) -> Result<()> {
        if self.fail {
            return Err(Error::Upload {
                message: "service unavailable".into(),
            });
        }
        assert!(request.tarball.is_file(), "tarball must exist when uploading");
        self.uploads.lock().unwrap().push(request.clone());
        Ok(())
    }
}
