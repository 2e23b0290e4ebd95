//! # Domain Layer
//!
//! Core types of rulekit: authored rules and their targets, the aggregate
//! results of validation and testing, the error taxonomy, and the ports that
//! rule-type backends and external collaborators implement.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entities`] | `Rule`, `Target`, `Metadata` |
//! | [`value_objects`] | `ValidateResult`, `TestMetrics`, `Findings`, `PassFail` |
//! | [`ports`] | `RuleType`, `TestRunner`, `Scanner`, `PolicyUploader` |
//! | [`error`] | `Error`, `MultiError`, `Result` |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entities::{Metadata, Rule, Target, derive_rule_id};
pub use error::{Error, MultiError, Result};
pub use ports::{
    PolicyUploader, RuleType, RunOptions, ScanRequest, Scanner, TestRunner, UploadRequest,
};
pub use value_objects::{
    Finding, Findings, PassFail, TestCase, TestMetrics, ValidateResult, ValidateSummary,
};
