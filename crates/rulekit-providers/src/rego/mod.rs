//! Rego source handling
//!
//! Anchor scanning and metadata rewriting for `.rego` rule files. Only the
//! package declaration and the metadata literal are located; the rest of
//! the program is never parsed.

mod scan;
pub mod rule_text;

pub use rule_text::{METADOC_NAME, RegoRuleText, TextRange, rego_quote};
