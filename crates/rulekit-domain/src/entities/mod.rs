//! Domain entities

pub mod rule;
pub mod target;

pub use rule::{Metadata, Rule, derive_rule_id};
pub use target::Target;
