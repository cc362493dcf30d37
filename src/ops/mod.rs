//! Mutation operations.
//!
//! Orchestration over the filing tree, scope guard, and policy engine.
//! Every operation checks scope before touching the filesystem and
//! supports a dry-run mode that performs all lookups and conflict
//! detection without mutating anything. Mutations reduce to single
//! renames wherever possible; existence checks happen immediately before
//! each rename to narrow (not eliminate) the snapshot race.

pub mod add;
pub mod archive;
pub mod create;
pub mod mv;

use std::path::Path;

/// Count the non-dot entries of a directory; 0 for files or unreadable
/// directories.
pub(crate) fn visible_item_count(path: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(path) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .count()
}

/// The free-text part of a directory name ("26.01 Unsorted" -> "Unsorted").
pub(crate) fn name_part(dir_name: &str) -> &str {
    dir_name
        .split_once(' ')
        .map(|(_, rest)| rest)
        .unwrap_or("")
}
