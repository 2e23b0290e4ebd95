//! Use cases: discovery, validation, testing and packaging of a policy set

pub mod discovery;
pub mod policy_manager;
pub mod tarball;

pub use discovery::{Discovered, discover_rules, find_policy_root};
pub use policy_manager::PolicyManager;
pub use tarball::write_tarball;
