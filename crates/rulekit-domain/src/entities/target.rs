//! Deployment targets a rule can evaluate against

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rule::Rule;

/// A supported platform / IaC language
///
/// Each target owns a sub-directory of the rule directory, named after
/// [`Target::as_str`], holding the target-specific source and fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Terraform,
    #[serde(rename = "tfplan")]
    TerraformPlan,
    Cloudformation,
    Kubernetes,
    Helm,
    Arm,
    Docker,
}

impl Target {
    /// Every supported target, in canonical order
    pub const ALL: [Target; 7] = [
        Target::Terraform,
        Target::TerraformPlan,
        Target::Cloudformation,
        Target::Kubernetes,
        Target::Helm,
        Target::Arm,
        Target::Docker,
    ];

    /// Directory name (and rendered filename prefix) of the target
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::TerraformPlan => "tfplan",
            Self::Cloudformation => "cloudformation",
            Self::Kubernetes => "kubernetes",
            Self::Helm => "helm",
            Self::Arm => "arm",
            Self::Docker => "docker",
        }
    }

    /// Directory containing this target's source and fixtures for `rule`
    pub fn path(self, rule: &Rule) -> PathBuf {
        rule.path.join(self.as_str())
    }

    /// Directory containing this target's test fixtures for `rule`
    pub fn tests_path(self, rule: &Rule) -> PathBuf {
        self.path(rule).join(crate::constants::TESTS_DIR)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown target '{s}'"))
    }
}
