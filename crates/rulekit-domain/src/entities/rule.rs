//! Authored policy rule

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::target::Target;

/// Author-supplied rule metadata (title, severity, custom identifiers)
pub type Metadata = BTreeMap<String, String>;

/// One authored policy rule
///
/// The identifier is fixed at construction; there is no setter.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    id: String,
    /// Rule source directory
    pub path: PathBuf,
    /// Name of the rule type (backend) owning this rule
    pub rule_type: String,
    /// Applicable targets, in canonical target order
    pub targets: Vec<Target>,
    /// Metadata injected into rendered output
    pub metadata: Metadata,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        rule_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            rule_type: rule_type.into(),
            targets: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Add a target, keeping the set ordered and free of duplicates
    pub fn with_target(mut self, target: Target) -> Self {
        if let Err(pos) = self.targets.binary_search(&target) {
            self.targets.insert(pos, target);
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Directory name of the rule (last path component)
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.id)
    }

    /// Human title, falling back to the identifier
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .map_or(self.id.as_str(), String::as_str)
    }

    /// A rule with no targets cannot be prepared, validated or tested
    pub fn is_usable(&self) -> bool {
        !self.targets.is_empty()
    }
}

/// Derive the stable rule identifier from its backend code and directory name
///
/// `("opl", "test_rule")` becomes `c-opl-test-rule`.
pub fn derive_rule_id(code: &str, dir_name: &str) -> String {
    format!(
        "c-{}-{}",
        code,
        dir_name.replace('_', "-").to_lowercase()
    )
}
