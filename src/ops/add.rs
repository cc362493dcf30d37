//! Add an external file or directory into an ID.

use crate::error::OpError;
use crate::policy;
use crate::scope::ScopeManifest;
use crate::tree::FilingTree;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of adding an external item into an ID.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub copied: bool,
    pub dry_run: bool,
}

/// Move (or copy) `source` into the ID named by `id_str`. The resolved
/// `ids_files_only` convention is enforced before anything moves.
pub fn add(
    tree: &FilingTree,
    scope: &ScopeManifest,
    source: &Path,
    id_str: &str,
    copy: bool,
    dry_run: bool,
) -> Result<AddOutcome, OpError> {
    let target = tree
        .find_by_id(id_str)
        .ok_or_else(|| OpError::AddressNotFound(id_str.to_string()))?;
    scope.check(id_str)?;

    if !source.exists() {
        return Err(OpError::AddressNotFound(source.display().to_string()));
    }
    if target.id.is_file {
        return Err(OpError::InvalidTarget(format!(
            "{} is a file ID, cannot add into it",
            id_str
        )));
    }

    let resolved = policy::resolve(&target.id.path, tree.root());
    if resolved.convention_bool("ids_files_only", false) && source.is_dir() {
        return Err(OpError::InvalidTarget(format!(
            "policy ids_files_only=true for {} — cannot add a directory",
            id_str
        )));
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| OpError::InvalidTarget(format!("{} has no name", source.display())))?;
    let dest = target.id.path.join(file_name);
    if dest.exists() {
        return Err(OpError::DestinationConflict(dest));
    }

    if !dry_run {
        if copy {
            copy_recursively(source, &dest)?;
        } else {
            fs::rename(source, &dest)?;
        }
        info!("added {} -> {}", source.display(), dest.display());
    }
    Ok(AddOutcome {
        source: source.to_path_buf(),
        dest,
        copied: copy,
        dry_run,
    })
}

fn copy_recursively(source: &Path, dest: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(source, dest)?;
    }
    Ok(())
}
