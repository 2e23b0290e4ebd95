//! Rego rule source with its two anchors located
//!
//! A [`RegoRuleText`] holds the raw text of one `.rego` file plus the byte
//! ranges of the package declaration and of the `__rego__metadoc__`
//! assignment. Rendering replaces only the metadata literal (or inserts one
//! after the package declaration); every other byte is copied unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use rulekit_domain::{Error, Result};

use super::scan::{balanced_end, is_identifier, split_entry, split_top_level};

/// Reserved name of the metadata literal
pub const METADOC_NAME: &str = "__rego__metadoc__";

const PACKAGE_KEYWORD: &str = "package";
const INDENT: &str = "  ";

/// Half-open byte range `[start, end)` into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Pre-existing metadata literal
#[derive(Debug, Clone)]
struct MetaDoc {
    range: TextRange,
    /// Unquoted key and raw value text, in source order
    entries: Vec<(String, String)>,
}

/// One Rego source file with its package declaration and metadata located
#[derive(Debug, Clone)]
pub struct RegoRuleText {
    path: PathBuf,
    text: String,
    package_decl: TextRange,
    metadoc: Option<MetaDoc>,
}

impl RegoRuleText {
    /// Read and scan a Rego file
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(path, text)
    }

    /// Scan already-loaded source; `path` is used for error reporting
    pub fn parse(path: impl Into<PathBuf>, text: String) -> Result<Self> {
        let path = path.into();
        let package_decl = find_package(&text)
            .ok_or_else(|| Error::parse(&path, "missing package declaration"))?;
        let metadoc = find_metadoc(&text, package_decl.end)
            .map_err(|message| Error::parse(&path, message))?;
        Ok(Self {
            path,
            text,
            package_decl,
            metadoc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn package_decl(&self) -> TextRange {
        self.package_decl
    }

    /// Dotted package path, e.g. `rules.p1.p2`
    pub fn package_name(&self) -> &str {
        self.text[self.package_decl.start + PACKAGE_KEYWORD.len()..self.package_decl.end].trim()
    }

    /// Range of the existing metadata literal assignment, if any
    pub fn metadoc(&self) -> Option<TextRange> {
        self.metadoc.as_ref().map(|m| m.range)
    }

    /// Keys of the existing metadata literal, in source order
    pub fn metadoc_keys(&self) -> impl Iterator<Item = &str> {
        self.metadoc
            .iter()
            .flat_map(|m| m.entries.iter().map(|(k, _)| k.as_str()))
    }

    /// Raw value text of an existing metadata key
    pub fn metadoc_value(&self, key: &str) -> Option<&str> {
        self.metadoc
            .as_ref()?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the file with `overrides` merged into its metadata literal
    ///
    /// Override keys come first, in the order given, with quoted values.
    /// Existing keys not overridden follow in source order with their
    /// original value text. Rendering is deterministic for equal inputs.
    pub fn render(&self, overrides: &[(&str, &str)]) -> String {
        let newline = line_ending(&self.text);
        let literal = self.metadoc_literal(overrides, newline);
        let mut out = String::with_capacity(self.text.len() + literal.len() + 2);
        match &self.metadoc {
            Some(metadoc) => {
                out.push_str(&self.text[..metadoc.range.start]);
                out.push_str(&literal);
                out.push_str(&self.text[metadoc.range.end..]);
            }
            None => {
                let rest = &self.text[self.package_decl.end..];
                out.push_str(&self.text[..self.package_decl.end]);
                out.push_str(newline);
                out.push_str(newline);
                out.push_str(&literal);
                out.push_str(rest);
                if rest.is_empty() {
                    out.push_str(newline);
                }
            }
        }
        out
    }

    /// Write the rendered file to `destination`
    pub fn write_file(&self, destination: &Path, overrides: &[(&str, &str)]) -> Result<()> {
        fs::write(destination, self.render(overrides))?;
        Ok(())
    }

    fn metadoc_literal(&self, overrides: &[(&str, &str)], newline: &str) -> String {
        let mut entries: Vec<(String, String)> = Vec::new();
        for &(key, value) in overrides {
            if let Some(existing) = entries.iter_mut().find(|(k, _)| k == key) {
                existing.1 = rego_quote(value);
            } else {
                entries.push((key.to_string(), rego_quote(value)));
            }
        }
        if let Some(metadoc) = &self.metadoc {
            for (key, value) in &metadoc.entries {
                if !entries.iter().any(|(k, _)| k == key) {
                    entries.push((key.clone(), value.clone()));
                }
            }
        }

        let mut literal = format!("{METADOC_NAME} := {{");
        for (i, (key, value)) in entries.iter().enumerate() {
            let separator = if i + 1 < entries.len() { "," } else { "" };
            let key = if is_identifier(key) {
                key.clone()
            } else {
                rego_quote(key)
            };
            literal.push_str(&format!("{newline}{INDENT}{key}: {value}{separator}"));
        }
        if !entries.is_empty() {
            literal.push_str(newline);
        }
        literal.push('}');
        literal
    }
}

/// Quote `value` as a Rego string literal
///
/// Rego string literals follow JSON escaping, so control characters are
/// escaped as well as quotes and backslashes.
pub fn rego_quote(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Line ending of the first line of `text`, `\n` when there is none
fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(i) if text[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Lines of `text` with their starting byte offsets
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

/// First line starting with the `package` keyword, up to end of line
fn find_package(text: &str) -> Option<TextRange> {
    lines_with_offsets(text).find_map(|(offset, line)| {
        let trimmed = line.trim_start();
        let after = trimmed.strip_prefix(PACKAGE_KEYWORD)?;
        if !after.starts_with([' ', '\t']) {
            return None;
        }
        let start = offset + (line.len() - trimmed.len());
        let end = offset + line.trim_end_matches(['\r', '\n']).len();
        Some(TextRange { start, end })
    })
}

/// The metadata literal assignment following the package declaration
fn find_metadoc(text: &str, from: usize) -> std::result::Result<Option<MetaDoc>, String> {
    for (offset, line) in lines_with_offsets(text).filter(|(o, _)| *o >= from) {
        let trimmed = line.trim_start();
        let Some(after_name) = trimmed.strip_prefix(METADOC_NAME) else {
            continue;
        };
        let after_name = after_name.trim_start();
        let Some(after_op) = after_name
            .strip_prefix(":=")
            .or_else(|| after_name.strip_prefix('=').filter(|r| !r.starts_with('=')))
        else {
            continue;
        };

        let start = offset + (line.len() - trimmed.len());
        let rest = &text[offset + line.len() - after_op.len()..];
        let value_offset = text.len() - rest.trim_start().len();
        if text.as_bytes().get(value_offset) != Some(&b'{') {
            return Err(format!("{METADOC_NAME} must be assigned an object literal"));
        }
        let end = balanced_end(text, value_offset)
            .ok_or_else(|| format!("unbalanced delimiters in {METADOC_NAME}"))?;
        let entries = parse_entries(&text[value_offset + 1..end - 1])?;
        return Ok(Some(MetaDoc {
            range: TextRange { start, end },
            entries,
        }));
    }
    Ok(None)
}

fn parse_entries(body: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut entries = Vec::new();
    for segment in split_top_level(body, b',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = split_entry(segment)
            .ok_or_else(|| format!("{METADOC_NAME} entry without key: {segment}"))?;
        let key = if key.starts_with('"') {
            serde_json::from_str::<String>(key)
                .map_err(|e| format!("invalid {METADOC_NAME} key {key}: {e}"))?
        } else {
            key.to_string()
        };
        entries.push((key, value.to_string()));
    }
    Ok(entries)
}
