//! Aggregate outcome of a fixture test run

use std::path::PathBuf;

use serde::Serialize;

use super::findings::PassFail;
use crate::entities::Target;
use crate::error::{Error, Result};

/// Record of a single (rule, target, fixture) execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub rule_id: String,
    pub target: Target,
    pub fixture: PathBuf,
    pub expected: PassFail,
    /// `None` when the runner never produced findings
    pub actual: Option<PassFail>,
    /// Runner or preparation error, rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCase {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.actual == Some(self.expected)
    }
}

/// Passed/failed counters across all fixture executions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestMetrics {
    pub passed: usize,
    pub failed: usize,
    pub cases: Vec<TestCase>,
}

impl TestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a case according to its outcome and keep its record
    pub fn record(&mut self, case: TestCase) {
        if case.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.cases.push(case);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Cases that did not meet their expectation
    pub fn failures(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter().filter(|c| !c.passed())
    }

    /// `Err(TestsFailed)` carrying the full metrics when anything failed
    pub fn into_result(self) -> Result<TestMetrics> {
        if self.failed > 0 {
            Err(Error::TestsFailed { metrics: self })
        } else {
            Ok(self)
        }
    }
}
