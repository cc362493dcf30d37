//! Creation operations: new IDs, new categories, and category bootstrap.

use crate::address::format_id;
use crate::error::OpError;
use crate::scope::ScopeManifest;
use crate::tree::FilingTree;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// A created ID entry.
#[derive(Debug, Clone)]
pub struct CreatedId {
    pub id: String,
    pub path: PathBuf,
    /// Convention notes for reserved slots (xx.00 meta, xx.01 Unsorted).
    pub notes: Vec<String>,
    pub dry_run: bool,
}

/// Create a new ID in a category, auto-numbered unless `explicit` is
/// given.
pub fn new_id(
    tree: &FilingTree,
    scope: &ScopeManifest,
    category: u8,
    name: &str,
    explicit: Option<u8>,
    dry_run: bool,
) -> Result<CreatedId, OpError> {
    scope.check(&format!("{:02}", category))?;
    let cat = tree
        .find_by_category(category)
        .ok_or_else(|| OpError::AddressNotFound(format!("category {:02}", category)))?;

    let sequence = match explicit {
        Some(sequence) => {
            let id_str = format_id(category, sequence);
            if let Some(existing) = tree.find_by_id(&id_str) {
                return Err(OpError::DestinationConflict(existing.id.path.clone()));
            }
            sequence
        }
        None => cat
            .category
            .next_available_sequence()
            .ok_or(OpError::CategoryFull(category))?,
    };

    let id = format_id(category, sequence);
    let mut notes = Vec::new();
    if sequence == 0 && !name.is_empty() && !name.eq_ignore_ascii_case("meta") {
        notes.push("xx.00 is conventionally category meta".to_string());
    }
    if sequence == 1 && !name.eq_ignore_ascii_case("unsorted") {
        notes.push("xx.01 is conventionally \"Unsorted\"".to_string());
    }

    let dir_name = if name.is_empty() {
        id.clone()
    } else {
        format!("{} {}", id, name)
    };
    let path = cat.category.path.join(dir_name);
    if path.exists() {
        return Err(OpError::DestinationConflict(path));
    }
    if !dry_run {
        fs::create_dir_all(&path)?;
        info!("created {}", path.display());
    }
    Ok(CreatedId {
        id,
        path,
        notes,
        dry_run,
    })
}

/// A created category, with any bootstrapped children.
#[derive(Debug, Clone)]
pub struct CreatedCategory {
    pub number: u8,
    pub path: PathBuf,
    pub bootstrapped: Vec<String>,
    pub dry_run: bool,
}

/// Create a new category in the area whose band contains `area_number`.
/// Auto-numbering skips the `x0` meta slot. With `bootstrap`, the
/// `xx.00` meta and `xx.01 Unsorted` children are created too.
pub fn new_category(
    tree: &FilingTree,
    scope: &ScopeManifest,
    area_number: u8,
    name: &str,
    explicit: Option<u8>,
    bootstrap: bool,
    dry_run: bool,
) -> Result<CreatedCategory, OpError> {
    scope.check(&format!("{:02}", area_number))?;
    let area = tree.area_containing(area_number).ok_or_else(|| {
        OpError::AddressNotFound(format!("no area contains number {:02}", area_number))
    })?;

    let used: BTreeSet<u8> = area.categories.iter().map(|c| c.number).collect();
    let number = match explicit {
        Some(number) => {
            if used.contains(&number) {
                let existing = tree
                    .find_by_category(number)
                    .map(|c| c.category.path.clone())
                    .unwrap_or_else(|| area.path.clone());
                return Err(OpError::DestinationConflict(existing));
            }
            if number < area.number || number > area.end_number {
                return Err(OpError::InvalidTarget(format!(
                    "category {:02} is outside area {}",
                    number, area
                )));
            }
            number
        }
        None => ((area.number + 1)..=area.end_number)
            .find(|n| !used.contains(n))
            .ok_or(OpError::AreaFull(area.number, area.end_number))?,
    };

    let path = area.path.join(format!("{:02} {}", number, name));
    if path.exists() {
        return Err(OpError::DestinationConflict(path));
    }

    let mut bootstrapped = Vec::new();
    if !dry_run {
        fs::create_dir_all(&path)?;
        info!("created {}", path.display());
    }
    if bootstrap {
        let meta = format_id(number, 0);
        let unsorted = format!("{} Unsorted", format_id(number, 1));
        if !dry_run {
            fs::create_dir(path.join(&meta))?;
            fs::create_dir(path.join(&unsorted))?;
        }
        bootstrapped.push(meta);
        bootstrapped.push(unsorted);
    }
    Ok(CreatedCategory {
        number,
        path,
        bootstrapped,
        dry_run,
    })
}

/// Bootstrap outcome for one category.
#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub category: String,
    pub created: Vec<String>,
    pub existing: Vec<String>,
    pub dry_run: bool,
}

/// Bootstrap a category with its `xx.00` meta and `xx.01 Unsorted`
/// children, skipping ones that already exist.
pub fn init_category(
    tree: &FilingTree,
    scope: &ScopeManifest,
    number: u8,
    meta: bool,
    unsorted: bool,
    dry_run: bool,
) -> Result<InitOutcome, OpError> {
    scope.check(&format!("{:02}", number))?;
    let cat = tree
        .find_by_category(number)
        .ok_or_else(|| OpError::AddressNotFound(format!("category {:02}", number)))?;

    let mut created = Vec::new();
    let mut existing = Vec::new();
    let mut slots = Vec::new();
    if meta {
        slots.push(format_id(number, 0));
    }
    if unsorted {
        slots.push(format!("{} Unsorted", format_id(number, 1)));
    }
    for slot in slots {
        let path = cat.category.path.join(&slot);
        if path.exists() {
            existing.push(slot);
        } else {
            if !dry_run {
                fs::create_dir(&path)?;
            }
            created.push(slot);
        }
    }
    Ok(InitOutcome {
        category: cat.category.to_string(),
        created,
        existing,
        dry_run,
    })
}

/// Whole-system bootstrap report.
#[derive(Debug, Clone)]
pub struct InitAllOutcome {
    pub sections: Vec<InitOutcome>,
    /// Categories skipped because they fall outside the declared scope.
    pub skipped_out_of_scope: Vec<String>,
    pub total_created: usize,
    pub dry_run: bool,
}

/// Bootstrap every category in the system. Out-of-scope categories are
/// skipped and reported rather than aborting the run.
pub fn init_all(
    tree: &FilingTree,
    scope: &ScopeManifest,
    meta: bool,
    unsorted: bool,
    dry_run: bool,
) -> Result<InitAllOutcome, OpError> {
    let mut sections = Vec::new();
    let mut skipped = Vec::new();
    let mut total = 0;
    for area in tree.areas() {
        for category in &area.categories {
            if scope.check(&format!("{:02}", category.number)).is_err() {
                skipped.push(category.to_string());
                continue;
            }
            let outcome = init_category(tree, scope, category.number, meta, unsorted, dry_run)?;
            if !outcome.created.is_empty() {
                total += outcome.created.len();
                sections.push(outcome);
            }
        }
    }
    Ok(InitAllOutcome {
        sections,
        skipped_out_of_scope: skipped,
        total_created: total,
        dry_run,
    })
}
