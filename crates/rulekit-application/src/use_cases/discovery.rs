//! Policy root detection and rule discovery

use std::fs;
use std::path::{Path, PathBuf};

use rulekit_domain::constants::{METADATA_FILE, POLICIES_DIR};
use rulekit_domain::{Error, Metadata, MultiError, Result, Rule, Target, derive_rule_id};
use serde_yaml::Value;
use walkdir::WalkDir;

use crate::registry::RuleTypeRegistry;

/// Resolve an explicit hint to a policy root
///
/// The hint may be the root itself or its `policies` directory.
pub fn resolve_hint(hint: &Path) -> Option<PathBuf> {
    if hint.join(POLICIES_DIR).is_dir() {
        return Some(hint.to_path_buf());
    }
    if hint.is_dir() && hint.file_name().is_some_and(|n| n == POLICIES_DIR) {
        return hint.parent().map(Path::to_path_buf);
    }
    None
}

/// Nearest ancestor of `start` (inclusive) holding a `policies` directory
pub fn find_policy_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(resolve_hint)
}

/// Rules found under a policy root plus the directories that failed
#[derive(Debug, Default)]
pub struct Discovered {
    pub rules: Vec<Rule>,
    pub errors: MultiError,
}

/// Discover one rule per `policies/<rule-type>/<rule-name>/` directory
///
/// Directories without a metadata file are not rule directories and are
/// skipped. Every other failure is collected and discovery continues.
pub fn discover_rules(root: &Path, registry: &RuleTypeRegistry) -> Result<Discovered> {
    let policies = root.join(POLICIES_DIR);
    if !policies.is_dir() {
        return Err(Error::not_found(format!(
            "policies directory {}",
            policies.display()
        )));
    }

    let mut discovered = Discovered::default();
    let walker = WalkDir::new(&policies)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| policies.clone(), Path::to_path_buf);
                discovered.errors.push(Error::rule_directory(path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if !dir.join(METADATA_FILE).is_file() {
            tracing::debug!(path = %dir.display(), "skipping directory without {}", METADATA_FILE);
            continue;
        }
        match load_rule(dir, registry) {
            Ok(rule) => {
                tracing::debug!(
                    rule_id = rule.id(),
                    rule_type = %rule.rule_type,
                    targets = rule.targets.len(),
                    "discovered rule"
                );
                discovered.rules.push(rule);
            }
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "invalid rule directory");
                discovered.errors.push(e);
            }
        }
    }

    Ok(discovered)
}

/// Build a rule from its directory; the parent directory names the rule type
fn load_rule(dir: &Path, registry: &RuleTypeRegistry) -> Result<Rule> {
    let type_name = dir
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::rule_directory(dir, "cannot determine rule type"))?;
    let dir_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::rule_directory(dir, "rule directory name is not valid UTF-8"))?;

    let backend = registry.require(type_name, dir)?;
    let metadata = read_metadata(&dir.join(METADATA_FILE))?;

    let mut rule = Rule::new(derive_rule_id(backend.code(), dir_name), dir, backend.name());
    rule.metadata = metadata;
    for target in target_dirs(dir)? {
        rule = rule.with_target(target);
    }

    if !rule.is_usable() {
        return Err(Error::rule_directory(dir, "no target directories present"));
    }
    Ok(rule)
}

/// Known target sub-directories of a rule directory
fn target_dirs(dir: &Path) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        match name.to_str().map(str::parse::<Target>) {
            Some(Ok(target)) => targets.push(target),
            _ => tracing::debug!(
                path = %entry.path().display(),
                "ignoring directory that is not a known target"
            ),
        }
    }
    Ok(targets)
}

/// Parse a flat metadata file; scalar values are stringified
fn read_metadata(path: &Path) -> Result<Metadata> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| Error::parse(path, e.to_string()))?;

    let mapping = match value {
        Value::Null => return Ok(Metadata::new()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(Error::parse(path, "metadata must be a mapping")),
    };

    let mut metadata = Metadata::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key)
            .ok_or_else(|| Error::parse(path, "metadata keys must be scalars"))?;
        let value = match value {
            Value::Null => continue,
            other => scalar_to_string(&other).ok_or_else(|| {
                Error::parse(path, format!("metadata value for '{key}' must be a scalar"))
            })?,
        };
        metadata.insert(key, value);
    }
    Ok(metadata)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
