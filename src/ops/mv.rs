//! Move, rename, and renumber.
//!
//! The destination string decides the intent: another dotted ID means
//! renumber, a bare category number means refile to the next available
//! sequence there, anything else is a rename that keeps the number.

use crate::address::{format_id, parse_id_str};
use crate::error::OpError;
use crate::scope::ScopeManifest;
use crate::tree::FilingTree;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Outcome of a move/rename/renumber.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    pub from_label: String,
    pub to_label: String,
    /// Present when the entry crossed categories: (source, destination).
    pub moved_between: Option<(String, String)>,
    pub dry_run: bool,
}

/// Move `source` (an ID or a bare category number) according to
/// `destination`. Scope is checked on the source and, for renumber and
/// refile, on the destination address as well.
pub fn mv(
    tree: &FilingTree,
    scope: &ScopeManifest,
    source: &str,
    destination: &str,
    dry_run: bool,
) -> Result<MoveOutcome, OpError> {
    let source_id = tree.find_by_id(source);
    let source_cat = if source_id.is_none() {
        source
            .parse::<u8>()
            .ok()
            .and_then(|n| tree.find_by_category(n))
    } else {
        None
    };
    if source_id.is_none() && source_cat.is_none() {
        return Err(OpError::AddressNotFound(source.to_string()));
    }
    scope.check(source)?;

    if let Some((new_cat, new_seq)) = parse_id_str(destination) {
        // RENUMBER: jd mv 26.01 22.01
        scope.check(destination)?;
        let source_id = source_id.ok_or_else(|| {
            OpError::InvalidTarget("cannot renumber a category to an ID".to_string())
        })?;
        if let Some(existing) = tree.find_by_id(destination) {
            return Err(OpError::DestinationConflict(existing.id.path.clone()));
        }
        let target_cat = tree
            .find_by_category(new_cat)
            .ok_or_else(|| OpError::AddressNotFound(format!("category {:02}", new_cat)))?;

        let to_label = join_label(&format_id(new_cat, new_seq), &source_id.id.name);
        let to = target_cat.category.path.join(&to_label);
        if to.exists() {
            return Err(OpError::DestinationConflict(to));
        }
        let moved_between = (source_id.category.number != new_cat).then(|| {
            (
                source_id.category.to_string(),
                target_cat.category.to_string(),
            )
        });
        return finish(source_id.id.path.clone(), to, to_label, moved_between, dry_run);
    }

    if !destination.is_empty() && destination.chars().all(|c| c.is_ascii_digit()) {
        // REFILE: jd mv 26.01 22 -> next available sequence in 22.
        let number: u8 = destination
            .parse()
            .map_err(|_| OpError::AddressNotFound(format!("category {}", destination)))?;
        scope.check(&format!("{:02}", number))?;
        let source_id = source_id.ok_or_else(|| {
            OpError::InvalidTarget("cannot refile a category into another category".to_string())
        })?;
        let target_cat = tree
            .find_by_category(number)
            .ok_or_else(|| OpError::AddressNotFound(format!("category {}", destination)))?;

        let sequence = target_cat
            .category
            .next_available_sequence()
            .ok_or(OpError::CategoryFull(number))?;
        let to_label = join_label(&format_id(number, sequence), &source_id.id.name);
        let to = target_cat.category.path.join(&to_label);
        if to.exists() {
            return Err(OpError::DestinationConflict(to));
        }
        let moved_between = Some((
            source_id.category.to_string(),
            target_cat.category.to_string(),
        ));
        return finish(source_id.id.path.clone(), to, to_label, moved_between, dry_run);
    }

    // RENAME: number preserved, text replaced.
    let (from, to_label) = match (source_id, source_cat) {
        (Some(id), _) => (
            id.id.path.clone(),
            format!("{} {}", id.id.id_str(), destination),
        ),
        (None, Some(cat)) => (
            cat.category.path.clone(),
            format!("{:02} {}", cat.category.number, destination),
        ),
        (None, None) => return Err(OpError::AddressNotFound(source.to_string())),
    };
    let to = from
        .parent()
        .map(|parent| parent.join(&to_label))
        .ok_or_else(|| OpError::InvalidTarget(format!("{} has no parent", from.display())))?;
    if to.exists() {
        return Err(OpError::DestinationConflict(to));
    }
    finish(from, to, to_label, None, dry_run)
}

fn join_label(id_str: &str, name: &str) -> String {
    if name.is_empty() {
        id_str.to_string()
    } else {
        format!("{} {}", id_str, name)
    }
}

fn finish(
    from: PathBuf,
    to: PathBuf,
    to_label: String,
    moved_between: Option<(String, String)>,
    dry_run: bool,
) -> Result<MoveOutcome, OpError> {
    let from_label = from
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !dry_run {
        fs::rename(&from, &to)?;
        info!("{} -> {}", from.display(), to.display());
    }
    Ok(MoveOutcome {
        from,
        to,
        from_label,
        to_label,
        moved_between,
        dry_run,
    })
}
