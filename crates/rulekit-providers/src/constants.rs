//! Backend identity and rule source file names

/// YAML backend name, also its rule-type directory name
pub const CHECKOV_NAME: &str = "checkov";

/// YAML backend identifier code
pub const CHECKOV_CODE: &str = "ckv";

/// Rego backend name, also its rule-type directory name
pub const OPAL_NAME: &str = "opal";

/// Rego backend identifier code
pub const OPAL_CODE: &str = "opl";

/// YAML rule body inside a target directory
pub const YAML_RULE_FILE: &str = "rule.yaml";

/// Rego rule source inside a target directory
pub const REGO_RULE_FILE: &str = "policy.rego";
