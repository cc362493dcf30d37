//! Name patterns for policy documents.
//!
//! Exactly four forms are recognized:
//!   "*.NN"  : any ID with sequence NN ("*.00" is every category meta)
//!   "x0"    : any area meta category (10, 20, ... 90; never 00)
//!   "NN.MM" : a specific ID, matched by name prefix
//!   "NN"    : a specific category number
//! Anything else never matches.

use once_cell::sync::Lazy;
use regex::Regex;

static SEQ_PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\.(\d{2})$").unwrap());
static NAME_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.(\d{2})(?:$|\s)").unwrap());
static AREA_META_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d)0\s").unwrap());
static ID_PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}$").unwrap());
static CATEGORY_PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}$").unwrap());

/// Match a policy pattern against a directory name.
pub fn matches(pattern: &str, name: &str) -> bool {
    if let Some(caps) = SEQ_PATTERN_RE.captures(pattern) {
        return NAME_ID_RE
            .captures(name)
            .is_some_and(|n| &n[1] == &caps[1]);
    }

    if pattern == "x0" {
        return AREA_META_RE
            .captures(name)
            .is_some_and(|m| &m[1] != "0");
    }

    if ID_PATTERN_RE.is_match(pattern) {
        return name.starts_with(pattern);
    }

    if CATEGORY_PATTERN_RE.is_match(pattern) {
        return name
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace));
    }

    false
}
