//! Filing tree
//!
//! In-memory snapshot of a Johnny Decimal hierarchy: areas own categories,
//! categories own IDs. The tree is rebuilt fully on each load; it is a
//! point-in-time read model, not a live view. Child order is lexicographic
//! by directory name, matching filesystem sort.

pub mod builder;
pub mod query;

use crate::address::format_id;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

pub use builder::{load, load_from};

/// The root of a scanned filing system.
#[derive(Debug)]
pub struct FilingTree {
    root: PathBuf,
    areas: Vec<AreaNode>,
    broken_symlinks: OnceCell<Vec<PathBuf>>,
}

/// An area directory, e.g. "20-29 Family". `number..=end_number` is the
/// inclusive category band.
#[derive(Debug, Clone)]
pub struct AreaNode {
    pub path: PathBuf,
    pub number: u8,
    pub end_number: u8,
    pub name: String,
    pub categories: Vec<CategoryNode>,
}

/// A category directory, e.g. "26 Recipes". Number uniqueness is not
/// enforced by construction; duplicates are a detectable anomaly.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub path: PathBuf,
    pub number: u8,
    pub name: String,
    pub ids: Vec<IdNode>,
}

/// An ID entry, e.g. "26.01 Unsorted". `category` and `sequence` are
/// parsed from the entry's own name, independent of the directory that
/// contains it. An ID may be a plain file rather than a directory.
#[derive(Debug, Clone)]
pub struct IdNode {
    pub path: PathBuf,
    pub category: u8,
    pub sequence: u8,
    pub name: String,
    pub is_file: bool,
}

impl FilingTree {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn areas(&self) -> &[AreaNode] {
        &self.areas
    }
}

impl CategoryNode {
    /// Smallest unused sequence number starting at 1. Sequence 0 is the
    /// meta slot and is never handed out. `None` when all 99 are taken.
    pub fn next_available_sequence(&self) -> Option<u8> {
        let used: std::collections::BTreeSet<u8> =
            self.ids.iter().map(|id| id.sequence).collect();
        (1..=99).find(|seq| !used.contains(seq))
    }
}

impl IdNode {
    /// Canonical dotted ID string, e.g. "26.01".
    pub fn id_str(&self) -> String {
        format_id(self.category, self.sequence)
    }
}

impl fmt::Display for AreaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02} {}", self.number, self.end_number, self.name)
    }
}

impl fmt::Display for CategoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} {}", self.number, self.name)
    }
}

impl fmt::Display for IdNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id_str())
        } else {
            write!(f, "{} {}", self.id_str(), self.name)
        }
    }
}
