//! Write-scope authorization.
//!
//! Agents declare which areas, categories, or IDs they may mutate via a
//! `jd.yaml` manifest. Reads are never gated. A missing or unparseable
//! manifest degrades to unrestricted (preserved for backward
//! compatibility; see DESIGN.md for the trust-boundary note).
//!
//! Manifest format:
//!   scope:
//!     - "20-29"   # entire area band
//!     - "42"      # single category (and its IDs)
//!     - "86.03"   # single ID
//!   # scope: all  -> unrestricted

use crate::error::OpError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Conventional manifest name in the invocation's working directory.
pub const SCOPE_FILENAME: &str = "jd.yaml";
/// Environment variable naming an explicit manifest path.
pub const SCOPE_ENV: &str = "JD_AGENT_SCOPE";

static BAND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})-(\d{2})$").unwrap());
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}$").unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}$").unwrap());
static TARGET_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})\.\d{2}$").unwrap());
static TARGET_CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})$").unwrap());
static TARGET_BAND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})-\d{2}$").unwrap());

/// The declared write scope for this process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeManifest {
    /// No manifest, explicit `scope: all`, or a manifest without a scope
    /// key.
    Unrestricted,
    /// Ordered scope patterns; first match wins.
    Patterns(Vec<String>),
}

impl ScopeManifest {
    /// Resolve and load the manifest: `JD_AGENT_SCOPE` path first (a
    /// missing target fails open), else `jd.yaml` in the working
    /// directory, else unrestricted.
    pub fn load() -> Self {
        match find_scope_file() {
            Some(path) => Self::from_file(&path),
            None => ScopeManifest::Unrestricted,
        }
    }

    /// Load a manifest from an explicit file.
    pub fn from_file(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("unreadable scope manifest at {}: {}", path.display(), err);
                return ScopeManifest::Unrestricted;
            }
        };
        let doc: Value = match serde_yaml::from_str(&contents) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("malformed scope manifest at {}: {}", path.display(), err);
                return ScopeManifest::Unrestricted;
            }
        };
        match doc.get("scope") {
            Some(Value::String(s)) if s == "all" => ScopeManifest::Unrestricted,
            Some(Value::Sequence(seq)) => ScopeManifest::Patterns(
                seq.iter()
                    .map(|v| match v {
                        Value::String(s) => s.trim().to_string(),
                        other => serde_yaml::to_string(other)
                            .map(|s| s.trim().to_string())
                            .unwrap_or_default(),
                    })
                    .collect(),
            ),
            _ => ScopeManifest::Unrestricted,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ScopeManifest::Unrestricted)
    }

    /// Gate a mutation on `target` ("NN", "NN.MM", or "NN-NN"). An
    /// unrestricted scope always allows; otherwise the first matching
    /// pattern allows, and exhaustion denies with a reason naming the
    /// declared scope.
    pub fn check(&self, target: &str) -> Result<(), OpError> {
        match self {
            ScopeManifest::Unrestricted => Ok(()),
            ScopeManifest::Patterns(patterns) => {
                if is_in_scope(target, patterns) {
                    Ok(())
                } else {
                    Err(OpError::OutOfScope(format!(
                        "{} is not in agent scope {:?}",
                        target, patterns
                    )))
                }
            }
        }
    }
}

/// Locate the manifest file. An explicit `JD_AGENT_SCOPE` that points at
/// a missing file yields no manifest rather than falling back.
pub fn find_scope_file() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(SCOPE_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Some(path);
        }
        warn!(
            "{} points at {} which does not exist; scope is unrestricted",
            SCOPE_ENV,
            path.display()
        );
        return None;
    }
    let cwd_manifest = std::env::current_dir().ok()?.join(SCOPE_FILENAME);
    cwd_manifest.exists().then_some(cwd_manifest)
}

/// Test a target address against declared patterns.
pub fn is_in_scope(target: &str, patterns: &[String]) -> bool {
    for pattern in patterns {
        let pattern = pattern.trim();

        if let Some(caps) = BAND_RE.captures(pattern) {
            let low: u8 = caps[1].parse().unwrap_or(0);
            let high: u8 = caps[2].parse().unwrap_or(0);
            if let Some(number) = extract_number(target) {
                if low <= number && number <= high {
                    return true;
                }
            }
            continue;
        }

        if CATEGORY_RE.is_match(pattern) {
            if let Some(number) = extract_number(target) {
                if format!("{:02}", number) == pattern {
                    return true;
                }
            }
            // IDs inside the category: "42.xx".
            if target.starts_with(&format!("{}.", pattern)) {
                return true;
            }
            continue;
        }

        if ID_RE.is_match(pattern) && target == pattern {
            return true;
        }
    }
    false
}

/// Leading category/area number of a target string.
fn extract_number(target: &str) -> Option<u8> {
    for re in [&TARGET_ID_RE, &TARGET_CATEGORY_RE, &TARGET_BAND_RE] {
        if let Some(caps) = re.captures(target) {
            return caps[1].parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_band_pattern_matches_contained_numbers() {
        let scope = patterns(&["20-29"]);
        assert!(is_in_scope("21", &scope));
        assert!(is_in_scope("26.01", &scope));
        assert!(is_in_scope("20-29", &scope));
        assert!(!is_in_scope("30", &scope));
        assert!(!is_in_scope("30.01", &scope));
    }

    #[test]
    fn test_category_pattern_matches_category_and_its_ids() {
        let scope = patterns(&["42"]);
        assert!(is_in_scope("42", &scope));
        assert!(is_in_scope("42.07", &scope));
        assert!(!is_in_scope("43", &scope));
        assert!(!is_in_scope("42-49", &scope));
    }

    #[test]
    fn test_id_pattern_matches_only_identical_target() {
        let scope = patterns(&["86.03"]);
        assert!(is_in_scope("86.03", &scope));
        assert!(!is_in_scope("86.04", &scope));
        assert!(!is_in_scope("86", &scope));
    }

    #[test]
    fn test_check_scope_allows_and_denies_with_reason() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join(SCOPE_FILENAME);
        std::fs::write(&manifest, "scope:\n  - \"20-29\"\n").unwrap();

        let scope = ScopeManifest::from_file(&manifest);
        assert!(scope.check("21").is_ok());

        let err = scope.check("30").unwrap_err();
        let reason = err.to_string();
        assert!(reason.contains("30"));
        assert!(reason.contains("20-29"));
    }

    #[test]
    fn test_all_and_missing_scope_key_are_unrestricted() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join(SCOPE_FILENAME);

        std::fs::write(&manifest, "scope: all\n").unwrap();
        assert!(ScopeManifest::from_file(&manifest).is_unrestricted());

        std::fs::write(&manifest, "other_key: 1\n").unwrap();
        assert!(ScopeManifest::from_file(&manifest).is_unrestricted());
    }

    #[test]
    fn test_malformed_manifest_fails_open() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join(SCOPE_FILENAME);
        std::fs::write(&manifest, "scope: [unclosed\n").unwrap();
        assert!(ScopeManifest::from_file(&manifest).is_unrestricted());
    }

    #[test]
    fn test_unrestricted_always_allows() {
        assert!(ScopeManifest::Unrestricted.check("99.99").is_ok());
    }
}
