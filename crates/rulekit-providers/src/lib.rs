//! # rulekit - Provider Implementations
//!
//! Concrete implementations of the domain ports.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Rule types | `RuleType` | Checkov (YAML), Opal (Rego) |
//! | Test runner | `TestRunner` | `ToolTestRunner` |
//! | Scanner | `Scanner` | `CommandScanner` |
//!
//! ## Feature Flags
//!
//! Each backend can be left out of a build:
//!
//! ```toml
//! [dependencies]
//! rulekit-providers = { version = "0.1", default-features = false, features = ["rule-type-opal"] }
//! ```
//!
//! Linking this crate is enough to register its backends; binaries that do
//! not otherwise reference it use `extern crate rulekit_providers;`.

pub use rulekit_domain::error::{Error, Result};

/// Backend names, codes and rule file names
pub mod constants;

/// Rego source scanning and metadata rewriting
pub mod rego;

/// Rule-type backend implementations
pub mod rule_types;

/// Subprocess scanner and report parsers
pub mod scanner;

pub use rego::{RegoRuleText, TextRange, rego_quote};
pub use scanner::{CommandScanner, ToolCommand};
