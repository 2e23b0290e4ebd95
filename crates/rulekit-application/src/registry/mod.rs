//! Rule-type backend registration
//!
//! Backends submit a [`RuleTypeEntry`] into the [`RULE_TYPES`] distributed
//! slice at link time. A [`RuleTypeRegistry`] is built from those entries
//! once per process ([`shared_registry`]) or explicitly by tests.

pub mod rule_types;

pub use rule_types::{
    RULE_TYPES, RuleTypeEntry, RuleTypeRegistry, list_rule_types, shared_registry,
};
