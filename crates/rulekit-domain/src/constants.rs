//! On-disk layout constants shared by discovery and the backends

/// Directory under the policy root holding one sub-directory per rule type
pub const POLICIES_DIR: &str = "policies";

/// Marker file that makes a directory a rule directory
pub const METADATA_FILE: &str = "metadata.yaml";

/// Per-target fixture directory
pub const TESTS_DIR: &str = "tests";

/// Fixtures expected to pass
pub const PASS_FIXTURES_DIR: &str = "pass";

/// Fixtures expected to fail
pub const FAIL_FIXTURES_DIR: &str = "fail";
