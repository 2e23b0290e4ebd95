//! # Infrastructure Layer
//!
//! Configuration loading, logging setup and the wiring that turns a
//! [`RulekitConfig`] into a ready [`PolicyManager`](rulekit_application::PolicyManager).

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use bootstrap::{build_manager, build_run_options, build_scanner};
pub use config::{ConfigLoader, LoggingConfig, RulekitConfig};
pub use error_ext::ErrorContext;
pub use logging::{init_logging, parse_log_level};
