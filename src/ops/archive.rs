//! Archive and restore.
//!
//! Archiving relocates an ID into its category's `xx.99 Archive`
//! directory (created on demand), or a category into its area meta
//! category's `x0.99 Archive`. Restore is the inverse: the item is found
//! inside the archive by name prefix and moved back; a numbering
//! conflict either fails with a report of both sides or, when renumber
//! is requested, assigns the next available number.

use crate::address::{format_id, parse_id_str};
use crate::error::OpError;
use crate::ops::{name_part, visible_item_count};
use crate::scope::ScopeManifest;
use crate::tree::builder::sorted_children;
use crate::tree::FilingTree;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of archiving an ID or category.
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub item: String,
    pub dest: PathBuf,
    pub archive_dir: PathBuf,
    pub created_archive_dir: bool,
    pub dry_run: bool,
}

/// Archive `source` (a dotted ID or a bare category number).
pub fn archive(
    tree: &FilingTree,
    scope: &ScopeManifest,
    source: &str,
    dry_run: bool,
) -> Result<ArchiveOutcome, OpError> {
    scope.check(source)?;

    if let Some(id) = tree.find_by_id(source) {
        let (archive_dir, created) =
            ensure_archive_dir(&id.category.path, id.category.number, dry_run)?;
        let item = id
            .id
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dest = archive_dir.join(&item);
        if dest.exists() {
            return Err(OpError::DestinationConflict(dest));
        }
        if !dry_run {
            fs::rename(&id.id.path, &dest)?;
            info!("archived {} -> {}", item, archive_dir.display());
        }
        return Ok(ArchiveOutcome {
            item,
            dest,
            archive_dir,
            created_archive_dir: created,
            dry_run,
        });
    }

    // Category: relocate into the area meta category's x0.99.
    let number: u8 = source
        .parse()
        .map_err(|_| OpError::AddressNotFound(source.to_string()))?;
    let cat = tree
        .find_by_category(number)
        .ok_or_else(|| OpError::AddressNotFound(format!("category {}", source)))?;
    let meta_number = cat.area.number;
    let meta_cat = tree.find_by_category(meta_number).ok_or_else(|| {
        OpError::AddressNotFound(format!("area meta category {:02}", meta_number))
    })?;

    let (archive_dir, created) = ensure_archive_dir(&meta_cat.category.path, meta_number, dry_run)?;
    let item = cat
        .category
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dest = archive_dir.join(&item);
    if dest.exists() {
        return Err(OpError::DestinationConflict(dest));
    }
    if !dry_run {
        fs::rename(&cat.category.path, &dest)?;
        info!("archived {} -> {}", item, archive_dir.display());
    }
    Ok(ArchiveOutcome {
        item,
        dest,
        archive_dir,
        created_archive_dir: created,
        dry_run,
    })
}

/// Outcome of restoring an archived ID or category.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    /// New address when the original number was taken and renumbering was
    /// requested.
    pub renumbered: Option<String>,
    pub removed_archive_dir: bool,
    pub dry_run: bool,
}

/// Restore `target` (a dotted ID or a bare category number) from the
/// appropriate `.99` archive. The archive directory is removed when the
/// restore leaves it empty.
pub fn restore(
    tree: &FilingTree,
    scope: &ScopeManifest,
    target: &str,
    renumber: bool,
    dry_run: bool,
) -> Result<RestoreOutcome, OpError> {
    if let Some((cat_num, _)) = parse_id_str(target) {
        return restore_id(tree, scope, target, cat_num, renumber, dry_run);
    }
    let number: u8 = target
        .parse()
        .map_err(|_| OpError::AddressNotFound(target.to_string()))?;
    restore_category(tree, scope, number, renumber, dry_run)
}

fn restore_id(
    tree: &FilingTree,
    scope: &ScopeManifest,
    target: &str,
    cat_num: u8,
    renumber: bool,
    dry_run: bool,
) -> Result<RestoreOutcome, OpError> {
    let cat = tree
        .find_by_category(cat_num)
        .ok_or_else(|| OpError::AddressNotFound(format!("category {:02}", cat_num)))?;
    scope.check(target)?;

    let archive_dir = find_archive_dir(&cat.category.path, cat_num).ok_or_else(|| {
        OpError::AddressNotFound(format!("archive {} in {}", format_id(cat_num, 99), cat.category))
    })?;
    let found = child_with_prefix(&archive_dir, target).ok_or_else(|| {
        OpError::AddressNotFound(format!("{} in {}", target, archive_dir.display()))
    })?;

    // The ID number may be taken again, possibly under a different name.
    let (to, renumbered) = match tree.find_by_id(target) {
        Some(existing) => {
            if !renumber {
                return Err(OpError::RestoreConflict {
                    address: target.to_string(),
                    archived: found.clone(),
                    existing: existing.id.path.clone(),
                    archived_items: visible_item_count(&found),
                    existing_items: visible_item_count(&existing.id.path),
                });
            }
            let sequence = cat
                .category
                .next_available_sequence()
                .ok_or(OpError::CategoryFull(cat_num))?;
            let id_str = format_id(cat_num, sequence);
            let found_name = file_name(&found);
            let label = format!("{} {}", id_str, name_part(&found_name))
                .trim_end()
                .to_string();
            (cat.category.path.join(label), Some(id_str))
        }
        None => {
            let to = cat.category.path.join(found.file_name().unwrap_or_default());
            if to.exists() {
                return Err(OpError::DestinationConflict(to));
            }
            (to, None)
        }
    };

    finish_restore(found, to, renumbered, archive_dir, dry_run)
}

fn restore_category(
    tree: &FilingTree,
    scope: &ScopeManifest,
    number: u8,
    renumber: bool,
    dry_run: bool,
) -> Result<RestoreOutcome, OpError> {
    scope.check(&format!("{:02}", number))?;
    let area = tree
        .area_containing(number)
        .ok_or_else(|| OpError::AddressNotFound(format!("no area contains category {:02}", number)))?;
    let meta_number = area.number;
    let meta_cat = tree.find_by_category(meta_number).ok_or_else(|| {
        OpError::AddressNotFound(format!("area meta category {:02}", meta_number))
    })?;

    let archive_dir = find_archive_dir(&meta_cat.category.path, meta_number).ok_or_else(|| {
        OpError::AddressNotFound(format!("archive {}", format_id(meta_number, 99)))
    })?;
    let prefix = format!("{:02} ", number);
    let found = child_with_prefix(&archive_dir, &prefix).ok_or_else(|| {
        OpError::AddressNotFound(format!(
            "category {:02} in {}",
            number,
            archive_dir.display()
        ))
    })?;

    let direct = area.path.join(found.file_name().unwrap_or_default());
    let (to, renumbered) = if direct.exists() {
        if !renumber {
            return Err(OpError::RestoreConflict {
                address: format!("{:02}", number),
                archived_items: visible_item_count(&found),
                existing_items: visible_item_count(&direct),
                archived: found,
                existing: direct,
            });
        }
        let used: std::collections::BTreeSet<u8> =
            area.categories.iter().map(|c| c.number).collect();
        let new_number = ((area.number + 1)..=area.end_number)
            .find(|n| !used.contains(n))
            .ok_or(OpError::AreaFull(area.number, area.end_number))?;
        let found_name = file_name(&found);
        let label = format!("{:02} {}", new_number, name_part(&found_name))
            .trim_end()
            .to_string();
        (area.path.join(label), Some(format!("{:02}", new_number)))
    } else {
        (direct, None)
    };

    finish_restore(found, to, renumbered, archive_dir, dry_run)
}

fn finish_restore(
    from: PathBuf,
    to: PathBuf,
    renumbered: Option<String>,
    archive_dir: PathBuf,
    dry_run: bool,
) -> Result<RestoreOutcome, OpError> {
    let mut removed_archive_dir = false;
    if !dry_run {
        fs::rename(&from, &to)?;
        info!("restored {} -> {}", from.display(), to.display());
        if archive_dir.exists() && visible_item_count(&archive_dir) == 0 {
            fs::remove_dir_all(&archive_dir)?;
            removed_archive_dir = true;
        }
    }
    Ok(RestoreOutcome {
        from,
        to,
        renumbered,
        removed_archive_dir,
        dry_run,
    })
}

/// Existing `xx.99` directory under `parent`, if any.
fn find_archive_dir(parent: &Path, category: u8) -> Option<PathBuf> {
    child_with_prefix(parent, &format_id(category, 99))
}

/// Create-or-find the `xx.99 Archive` directory under `parent`.
fn ensure_archive_dir(
    parent: &Path,
    category: u8,
    dry_run: bool,
) -> Result<(PathBuf, bool), OpError> {
    if let Some(existing) = find_archive_dir(parent, category) {
        return Ok((existing, false));
    }
    let path = parent.join(format!("{} Archive", format_id(category, 99)));
    if !dry_run {
        fs::create_dir(&path)?;
        info!("created {}", path.display());
    }
    Ok((path, true))
}

fn child_with_prefix(dir: &Path, prefix: &str) -> Option<PathBuf> {
    sorted_children(dir).into_iter().find(|child| {
        child.is_dir()
            && child
                .file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
