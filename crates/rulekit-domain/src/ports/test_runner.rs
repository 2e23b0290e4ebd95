//! Scan and fixture-test execution ports

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::entities::Target;
use crate::error::Result;
use crate::value_objects::Findings;

/// Everything an external scanner needs to evaluate one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Tool name (e.g. "checkov", "opal")
    pub tool: String,
    pub target: Target,
    /// Input to scan (fixture directory or file)
    pub directory: PathBuf,
    /// Rendered custom rules to load, if any
    pub rules_dir: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

/// External scan collaborator (subprocess, container, in-process engine)
///
/// Blocking: returns complete findings or an error before the next call.
pub trait Scanner: Send + Sync {
    fn scan(&self, request: &ScanRequest) -> Result<Findings>;
}

/// Options shared by every backend operation of one invocation
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Scanner used by test runners; validation does not need one
    pub scanner: Option<Arc<dyn Scanner>>,
    /// Arguments appended to every scan
    pub extra_args: Vec<String>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("scanner", &self.scanner.as_ref().map(|_| "<scanner>"))
            .field("extra_args", &self.extra_args)
            .finish()
    }
}

/// Executable test step for one target
pub trait TestRunner: Send + Sync {
    /// Evaluate `fixture` with the rendered rules found in `rules_dir`
    fn run(&self, fixture: &Path, rules_dir: &Path) -> Result<Findings>;
}
