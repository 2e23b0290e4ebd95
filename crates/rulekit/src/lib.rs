//! # rulekit
//!
//! Author, vet, test and package custom policy rules for the `checkov`
//! (YAML) and `opal` (Rego) scanners.
//!
//! ## Example
//!
//! ```ignore
//! use rulekit::infrastructure::{ConfigLoader, build_manager};
//!
//! let config = ConfigLoader::new().load()?;
//! let mut manager = build_manager(&config)?;
//! manager.detect_policy(None)?;
//! manager.load_rules()?;
//! manager.validate_rules().into_result()?;
//! manager.create_tarball(std::path::Path::new("policies.tar.gz"))?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Rules, targets, results, errors and port traits
//! - `application` - Rule-type registry and the policy manager
//! - `providers` - Rego processing, backends and the subprocess scanner
//! - `infrastructure` - Configuration, logging and wiring

// Force-link rulekit-providers so its rule-type registrations are included
extern crate rulekit_providers;

/// Domain layer - core types and ports
pub mod domain {
    pub use rulekit_domain::*;
}

/// Application layer - registry and policy manager
pub mod application {
    pub use rulekit_application::*;
}

/// Provider implementations
pub mod providers {
    pub use rulekit_providers::*;
}

/// Infrastructure layer - config, logging and wiring
pub mod infrastructure {
    pub use rulekit_infrastructure::*;
}

pub use domain::*;

pub use application::{PolicyManager, RuleTypeRegistry, shared_registry};
