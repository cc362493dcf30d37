//! Cascading policy resolution.
//!
//! A `policy.yaml` may live in any meta directory (`xx.00`). Resolving the
//! effective policy for a location walks the ancestor chain from the filing
//! root down to the target, deep-merging each document over built-in
//! defaults (most specific wins), then layering any `patterns` entries
//! whose pattern matches the target's own name. Resolution never fails:
//! malformed documents are skipped, missing meta directories simply
//! contribute nothing.

pub mod document;
pub mod merge;
pub mod meta;
pub mod pattern;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Conventional name of the override document inside a meta directory.
pub const POLICY_FILENAME: &str = "policy.yaml";

static DEFAULTS_YAML: &str = r#"
conventions:
  meta_category: true
  meta_id: true
  unsorted_id: true
  ids_files_only: false
  ids_as_files: false
  capture_category: "01"
  naming:
    separator: "-"
    case: "sentence"
    no_trailing_spaces: true
    no_special_chars: true
ignore:
  - .DS_Store
  - .git
  - __pycache__
  - .Trash
  - "*.pyc"
"#;

static DEFAULTS: Lazy<Mapping> = Lazy::new(|| {
    match serde_yaml::from_str::<Value>(DEFAULTS_YAML) {
        Ok(Value::Mapping(map)) => map,
        _ => Mapping::new(),
    }
});

/// A fresh copy of the built-in baseline document.
pub fn defaults() -> Mapping {
    DEFAULTS.clone()
}

/// Typed view of the closed convention set. Unknown or malformed values
/// fall back to the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    pub meta_category: bool,
    pub meta_id: bool,
    pub unsorted_id: bool,
    pub ids_files_only: bool,
    pub ids_as_files: bool,
    pub capture_category: String,
    pub naming: Naming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Naming {
    pub separator: String,
    pub case: String,
    pub no_trailing_spaces: bool,
    pub no_special_chars: bool,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            meta_category: true,
            meta_id: true,
            unsorted_id: true,
            ids_files_only: false,
            ids_as_files: false,
            capture_category: "01".to_string(),
            naming: Naming::default(),
        }
    }
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            separator: "-".to_string(),
            case: "sentence".to_string(),
            no_trailing_spaces: true,
            no_special_chars: true,
        }
    }
}

/// A declared category-to-symlink-target binding from a document's
/// `symlinks` section. Consumed by the consistency check, not by
/// resolution itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkBinding {
    pub category: u8,
    pub target: PathBuf,
}

/// The deep-merged result of defaults plus every document on the chain.
/// Computed on demand per query; never cached across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolicy {
    doc: Mapping,
}

impl ResolvedPolicy {
    pub fn as_mapping(&self) -> &Mapping {
        &self.doc
    }

    /// Navigate a dot-separated path through the whole document. Numeric
    /// segments also match numeric mapping keys (YAML parses bare numbers
    /// as numbers).
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        lookup_dotted(&self.doc, dotted)
    }

    /// Navigate a dot-separated path under the `conventions` section.
    pub fn convention(&self, dotted: &str) -> Option<&Value> {
        let conventions = self.doc.get("conventions")?.as_mapping()?;
        lookup_dotted(conventions, dotted)
    }

    pub fn convention_bool(&self, dotted: &str, default: bool) -> bool {
        self.convention(dotted)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    pub fn convention_str(&self, dotted: &str, default: &str) -> String {
        self.convention(dotted)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// Typed view of the closed convention set.
    pub fn conventions(&self) -> Conventions {
        self.doc
            .get("conventions")
            .cloned()
            .and_then(|value| serde_yaml::from_value(value).ok())
            .unwrap_or_default()
    }

    /// The `ignore` list of filesystem artifacts to skip.
    pub fn ignore_patterns(&self) -> Vec<String> {
        self.doc
            .get("ignore")
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Declared symlink bindings from the `symlinks` section.
    pub fn symlink_bindings(&self) -> Vec<SymlinkBinding> {
        let Some(symlinks) = self.doc.get("symlinks").and_then(Value::as_mapping) else {
            return Vec::new();
        };
        let mut bindings = Vec::new();
        for (key, decl) in symlinks {
            let Some(category) = key_as_category(key) else {
                continue;
            };
            let Some(target) = decl
                .as_mapping()
                .and_then(|m| m.get("target"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            bindings.push(SymlinkBinding {
                category,
                target: PathBuf::from(target),
            });
        }
        bindings
    }
}

/// One level of the cascade, for diagnostics ("which documents affect
/// this path").
#[derive(Debug, Clone)]
pub struct CascadeLevel {
    pub dir: PathBuf,
    pub document: Option<PathBuf>,
}

/// Resolve the effective policy for `target` under `root`.
pub fn resolve(target: &Path, root: &Path) -> ResolvedPolicy {
    let chain = ancestor_chain(target, root);
    // Patterns match against the target's own (resolved) name, not the
    // chain directory being merged.
    let target_name = target
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| target.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    let mut effective = Value::Mapping(defaults());
    for dir in &chain {
        let Some(doc) = document::load_for(dir) else {
            continue;
        };
        let mut base = Mapping::new();
        for (key, value) in &doc {
            if key.as_str() == Some("patterns") {
                continue;
            }
            base.insert(key.clone(), value.clone());
        }
        if !base.is_empty() {
            merge::deep_merge(&mut effective, &Value::Mapping(base));
        }
        let Some(patterns) = doc.get("patterns").and_then(Value::as_mapping) else {
            continue;
        };
        for (key, payload) in patterns {
            let Some(pat) = pattern_key(key) else {
                continue;
            };
            if !pattern::matches(&pat, &target_name) {
                continue;
            }
            // A payload that already carries a `conventions` key is merged
            // as-is; otherwise it is treated as the conventions value.
            let overlay = if payload
                .as_mapping()
                .is_some_and(|m| m.contains_key("conventions"))
            {
                payload.clone()
            } else {
                let mut wrapper = Mapping::new();
                wrapper.insert(Value::String("conventions".to_string()), payload.clone());
                Value::Mapping(wrapper)
            };
            merge::deep_merge(&mut effective, &overlay);
        }
    }

    match effective {
        Value::Mapping(doc) => ResolvedPolicy { doc },
        _ => ResolvedPolicy { doc: defaults() },
    }
}

/// The chain of cascade levels from `root` to `target`, each with the
/// policy document path when one exists.
pub fn cascade_sources(target: &Path, root: &Path) -> Vec<CascadeLevel> {
    ancestor_chain(target, root)
        .into_iter()
        .map(|dir| {
            let document = meta::find_meta_dir(&dir)
                .map(|meta| meta.join(POLICY_FILENAME))
                .filter(|doc| doc.exists());
            CascadeLevel { dir, document }
        })
        .collect()
}

/// Ancestor directories from `root` to `target` inclusive, built by
/// parent-traversal from `target`. If the filesystem root is reached
/// before meeting `root`, `root` is appended as a safety net.
fn ancestor_chain(target: &Path, root: &Path) -> Vec<PathBuf> {
    let root_resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut chain = Vec::new();
    let mut current = target.to_path_buf();
    loop {
        chain.push(current.clone());
        let resolved = current.canonicalize().unwrap_or_else(|_| current.clone());
        if resolved == root_resolved {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                if !chain.iter().any(|p| p == root) {
                    chain.push(root.to_path_buf());
                }
                break;
            }
        }
    }
    chain.reverse();
    chain
}

fn pattern_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn key_as_category(key: &Value) -> Option<u8> {
    match key {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        _ => None,
    }
}

fn lookup_dotted<'a>(map: &'a Mapping, dotted: &str) -> Option<&'a Value> {
    let mut current: Option<&Value> = None;
    let mut scope = map;
    for part in dotted.split('.') {
        let value = lookup_key(scope, part)?;
        current = Some(value);
        scope = match value.as_mapping() {
            Some(next) => next,
            // A non-mapping mid-chain only succeeds when it is the last
            // segment; otherwise the next iteration fails the lookup.
            None => &*EMPTY_MAPPING,
        };
    }
    current
}

static EMPTY_MAPPING: Lazy<Mapping> = Lazy::new(Mapping::new);

fn lookup_key<'a>(map: &'a Mapping, part: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(part) {
        return Some(value);
    }
    if let Ok(n) = part.parse::<u64>() {
        if let Some(value) = map.get(Value::Number(n.into())) {
            return Some(value);
        }
    }
    if let Ok(f) = part.parse::<f64>() {
        if let Some(value) = map.get(Value::Number(f.into())) {
            return Some(value);
        }
    }
    None
}
