//! Value objects produced by validation, testing and scanning

pub mod findings;
pub mod test_metrics;
pub mod validate_result;

pub use findings::{Finding, Findings, PassFail};
pub use test_metrics::{TestCase, TestMetrics};
pub use validate_result::{ValidateResult, ValidateSummary};
