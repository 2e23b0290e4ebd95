//! Rule-Type Registry
//!
//! Auto-registration system for rule-type backends. Backends register
//! themselves via `#[linkme::distributed_slice(RULE_TYPES)]` and are
//! resolved by name when rules are discovered.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use rulekit_domain::{Error, Result, RuleType};

/// Registry entry for rule-type backends
///
/// Each backend registers itself with this entry. The entry carries
/// metadata and a factory creating the backend instance.
pub struct RuleTypeEntry {
    /// Unique rule-type name (e.g., "checkov", "opal"), also its directory name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the backend
    pub factory: fn() -> Arc<dyn RuleType>,
}

// Auto-collection via linkme distributed slices - backends submit entries at compile time
#[linkme::distributed_slice]
pub static RULE_TYPES: [RuleTypeEntry] = [..];

/// Mapping from rule-type name to backend
///
/// Immutable once handed out through [`shared_registry`]; tests build
/// isolated instances with [`RuleTypeRegistry::new`] and
/// [`RuleTypeRegistry::register`].
#[derive(Default, Clone)]
pub struct RuleTypeRegistry {
    backends: BTreeMap<String, Arc<dyn RuleType>>,
}

impl RuleTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every entry linked into the binary
    ///
    /// Entries with a duplicate name after the first are ignored with a warning.
    pub fn from_linked() -> Self {
        let mut registry = Self::new();
        for entry in RULE_TYPES {
            let backend = (entry.factory)();
            if registry.register(backend) {
                tracing::debug!(rule_type = entry.name, "registered rule type");
            } else {
                tracing::warn!(rule_type = entry.name, "duplicate rule type registration ignored");
            }
        }
        registry
    }

    /// Register a backend under its own name
    ///
    /// Returns `false` and keeps the existing backend when the name is taken.
    pub fn register(&mut self, backend: Arc<dyn RuleType>) -> bool {
        let name = backend.name();
        if self.backends.contains_key(name) {
            return false;
        }
        self.backends.insert(name.to_string(), backend);
        true
    }

    /// Look up a backend by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn RuleType>> {
        self.backends.get(name).cloned()
    }

    /// Look up the backend declared by the rule directory at `path`
    ///
    /// An unregistered name is a discovery error listing what is available.
    pub fn require(&self, name: &str, path: &Path) -> Result<Arc<dyn RuleType>> {
        self.get(name).ok_or_else(|| {
            Error::rule_directory(
                path,
                format!(
                    "unregistered rule type '{name}'. Available rule types: {:?}",
                    self.names()
                ),
            )
        })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for RuleTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTypeRegistry")
            .field("rule_types", &self.names())
            .finish()
    }
}

static SHARED: LazyLock<Arc<RuleTypeRegistry>> =
    LazyLock::new(|| Arc::new(RuleTypeRegistry::from_linked()));

/// Process-wide registry built once from [`RULE_TYPES`]
pub fn shared_registry() -> Arc<RuleTypeRegistry> {
    Arc::clone(&SHARED)
}

/// List all linked rule types as (name, description) pairs
pub fn list_rule_types() -> Vec<(&'static str, &'static str)> {
    RULE_TYPES.iter().map(|e| (e.name, e.description)).collect()
}
