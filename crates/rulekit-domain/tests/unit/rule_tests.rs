//! Unit tests for rules and targets

use std::path::PathBuf;

use rulekit_domain::{Rule, Target, derive_rule_id};

#[test]
fn test_derive_rule_id() {
    assert_eq!(derive_rule_id("opl", "test_rule"), "c-opl-test-rule");
    assert_eq!(derive_rule_id("ckv", "S3_Public"), "c-ckv-s3-public");
}

#[test]
fn test_targets_stay_ordered_and_unique() {
    let rule = Rule::new("c-opl-x", "/p/policies/opal/x", "opal")
        .with_target(Target::Kubernetes)
        .with_target(Target::Terraform)
        .with_target(Target::Kubernetes);

    assert_eq!(rule.targets, vec![Target::Terraform, Target::Kubernetes]);
    assert!(rule.is_usable());
}

#[test]
fn test_rule_without_targets_is_not_usable() {
    let rule = Rule::new("c-opl-x", "/p/x", "opal");
    assert!(!rule.is_usable());
}

#[test]
fn test_target_paths() {
    let rule = Rule::new("c-opl-x", "/p/policies/opal/x", "opal");
    assert_eq!(
        Target::Terraform.path(&rule),
        PathBuf::from("/p/policies/opal/x/terraform")
    );
    assert_eq!(
        Target::Kubernetes.tests_path(&rule),
        PathBuf::from("/p/policies/opal/x/kubernetes/tests")
    );
}

#[test]
fn test_target_parse_round_trip() {
    for target in Target::ALL {
        assert_eq!(target.as_str().parse::<Target>(), Ok(target));
    }
    assert!("bogus".parse::<Target>().is_err());
}

#[test]
fn test_title_falls_back_to_id() {
    let rule = Rule::new("c-opl-x", "/p/x", "opal");
    assert_eq!(rule.title(), "c-opl-x");
    let rule = rule.with_metadata("title", "No public buckets");
    assert_eq!(rule.title(), "No public buckets");
    assert_eq!(rule.name(), "x");
}
