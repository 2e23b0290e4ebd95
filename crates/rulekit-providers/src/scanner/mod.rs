//! Scanner adapters
//!
//! A [`CommandScanner`] implements the domain `Scanner` port by running the
//! external tool and parsing its JSON report into findings.

pub mod command;
pub mod parsers;

pub use command::{CommandScanner, ToolCommand};
pub use parsers::parse_report;
