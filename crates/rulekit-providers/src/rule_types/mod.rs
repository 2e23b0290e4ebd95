//! Rule-type backends
//!
//! Each backend implements the domain `RuleType` port and registers itself
//! into the application registry through linkme.

pub mod common;

#[cfg(feature = "rule-type-checkov")]
pub mod checkov;
#[cfg(feature = "rule-type-opal")]
pub mod opal;

pub use common::{ToolTestRunner, find_rule_result};

#[cfg(feature = "rule-type-checkov")]
pub use checkov::CheckovRuleType;
#[cfg(feature = "rule-type-opal")]
pub use opal::OpalRuleType;
