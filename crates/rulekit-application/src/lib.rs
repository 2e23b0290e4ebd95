//! Application Layer - rulekit
//!
//! Orchestrates the domain types: the rule-type registry that backends
//! register into, and the policy manager that discovers, validates, tests
//! and packages rules.
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `rulekit-domain`: entities, value objects, ports and the error taxonomy
//! - Pure Rust libraries for serialization, discovery and archiving
//!
//! Backend implementations live in `rulekit-providers`, which depends on
//! this crate to submit entries into [`registry::RULE_TYPES`].

pub mod registry;
pub mod use_cases;

pub use registry::{RULE_TYPES, RuleTypeEntry, RuleTypeRegistry, shared_registry};
pub use use_cases::PolicyManager;
