//! Address classification for Johnny Decimal directory names.
//!
//! Names are classified with fixed lexical patterns: areas ("20-29 Family",
//! en-dash tolerated), IDs ("26.01 Unsorted", "26.00" may stand alone) and
//! categories ("26 Recipes"). Classification precedence is area, then ID,
//! then category, so a category match never shadows the more specific forms.

use crate::error::ScanError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static AREA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})[-–](\d{2}) (.+)$").unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})(?: (.+))?$").unwrap());
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2}) (.+)$").unwrap());
static ID_STR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})$").unwrap());

/// A classified Johnny Decimal name. Produced only by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    /// Top-level numeric band, e.g. "20-29 Family".
    Area {
        number: u8,
        end_number: u8,
        name: String,
    },
    /// Two-digit numbered grouping, e.g. "26 Recipes".
    Category { number: u8, name: String },
    /// Leaf address, e.g. "26.01 Unsorted". The "xx.00" meta slot has an
    /// empty name.
    Id {
        category: u8,
        sequence: u8,
        name: String,
    },
}

/// Classify a directory or file name. Returns `None` for names that match
/// no Johnny Decimal form (orphans).
pub fn classify(name: &str) -> Option<Address> {
    if let Some(caps) = AREA_RE.captures(name) {
        return Some(Address::Area {
            number: two_digits(&caps[1]),
            end_number: two_digits(&caps[2]),
            name: caps[3].to_string(),
        });
    }
    if let Some(caps) = ID_RE.captures(name) {
        return Some(Address::Id {
            category: two_digits(&caps[1]),
            sequence: two_digits(&caps[2]),
            name: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        });
    }
    if let Some(caps) = CATEGORY_RE.captures(name) {
        return Some(Address::Category {
            number: two_digits(&caps[1]),
            name: caps[2].to_string(),
        });
    }
    None
}

pub fn is_area_name(name: &str) -> bool {
    AREA_RE.is_match(name)
}

pub fn is_id_name(name: &str) -> bool {
    ID_RE.is_match(name)
}

pub fn is_category_name(name: &str) -> bool {
    matches!(classify(name), Some(Address::Category { .. }))
}

/// Parse a dotted ID string like "26.01" into (category, sequence).
pub fn parse_id_str(id_str: &str) -> Option<(u8, u8)> {
    let caps = ID_STR_RE.captures(id_str)?;
    Some((two_digits(&caps[1]), two_digits(&caps[2])))
}

/// Format an ID as its canonical dotted string: (26, 1) -> "26.01".
pub fn format_id(category: u8, sequence: u8) -> String {
    format!("{:02}.{:02}", category, sequence)
}

fn two_digits(s: &str) -> u8 {
    // The regexes only capture exactly two ASCII digits.
    s.parse().unwrap_or(0)
}

/// A directory is a filing-system root when at least 3 of its non-dot
/// subdirectories are area-shaped. The threshold tolerates foreign
/// directories ("FabFilter", "Zoom", ...) commonly found next to areas.
pub fn is_filing_root(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    let mut area_count = 0usize;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() && is_area_name(name) {
            area_count += 1;
            if area_count >= 3 {
                return true;
            }
        }
    }
    false
}

/// Walk up from `start` looking for a filing root, stopping at `boundary`
/// (normally the user's home directory). The directory just above the
/// boundary is still tested, matching the historical walk.
pub fn find_root(start: &Path, boundary: &Path) -> Result<PathBuf, ScanError> {
    let mut current = start.to_path_buf();
    loop {
        if is_filing_root(&current) {
            return Ok(current);
        }
        if !current.starts_with(boundary) {
            break;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Err(ScanError::NotJohnnyDecimalDirectory(start.to_path_buf()))
}

impl Address {
    /// Canonical addressing string: "NN-NN" for areas, "NN" for
    /// categories, "NN.MM" for IDs.
    pub fn address_str(&self) -> String {
        match self {
            Address::Area {
                number, end_number, ..
            } => format!("{:02}-{:02}", number, end_number),
            Address::Category { number, .. } => format!("{:02}", number),
            Address::Id {
                category, sequence, ..
            } => format_id(*category, *sequence),
        }
    }
}
