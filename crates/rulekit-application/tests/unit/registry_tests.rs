//! Tests for the rule-type registry
//!
//! Uses `extern crate rulekit_providers` (see unit.rs) so the real backends
//! are linked into the slice.

use std::path::Path;
use std::sync::Arc;

use rulekit_application::registry::{
    RULE_TYPES, RuleTypeRegistry, list_rule_types, shared_registry,
};
use rulekit_domain::Error;
use rulekit_providers::rule_types::{CheckovRuleType, OpalRuleType};

#[test]
fn test_linked_backends_are_registered() {
    let names: Vec<&str> = RULE_TYPES.iter().map(|e| e.name).collect();
    assert!(names.contains(&"checkov"), "checkov missing from {names:?}");
    assert!(names.contains(&"opal"), "opal missing from {names:?}");

    let listed = list_rule_types();
    assert!(listed.iter().all(|(_, description)| !description.is_empty()));
}

#[test]
fn test_from_linked_resolves_by_name() {
    let registry = RuleTypeRegistry::from_linked();
    assert_eq!(registry.names(), vec!["checkov", "opal"]);

    let opal = registry.get("opal").expect("opal should be registered");
    assert_eq!(opal.code(), "opl");
    assert_eq!(registry.get("checkov").map(|b| b.code()), Some("ckv"));
}

#[test]
fn test_register_is_idempotent() {
    let mut registry = RuleTypeRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.register(Arc::new(OpalRuleType::new())));
    assert!(!registry.register(Arc::new(OpalRuleType::new())));
    assert!(registry.register(Arc::new(CheckovRuleType::new())));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_require_unregistered_is_discovery_error() {
    let mut registry = RuleTypeRegistry::new();
    registry.register(Arc::new(OpalRuleType::new()));

    match registry.require("bogus", Path::new("/p/policies/bogus/x")) {
        Err(e @ Error::RuleDirectory { .. }) => {
            assert!(e.is_discovery());
            let message = e.to_string();
            assert!(message.contains("bogus"));
            assert!(message.contains("opal"));
        }
        Err(other) => panic!("Expected RuleDirectory error, got {other:?}"),
        Ok(_) => panic!("Expected RuleDirectory error, got a backend"),
    }
}

#[test]
fn test_shared_registry_is_built_once() {
    let a = shared_registry();
    let b = shared_registry();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.get("checkov").is_some());
}
