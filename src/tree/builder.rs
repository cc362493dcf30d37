//! Filing tree builder: one full, ordered directory walk.
//!
//! Scanning is level-bounded: root children are tested for the area shape,
//! area children for the category shape, category children for the ID
//! shape. Symlinked entries whose target does not resolve are skipped at
//! every level. Entries are visited in lexicographic name order so two
//! scans of an unchanged tree produce identical snapshots.

use crate::address::{self, classify, Address};
use crate::error::ScanError;
use crate::tree::{AreaNode, CategoryNode, FilingTree, IdNode};
use once_cell::unsync::OnceCell;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scan a filing root into a tree snapshot. Fails when `root` does not
/// satisfy the root heuristic (at least 3 area-shaped children).
pub fn load(root: &Path) -> Result<FilingTree, ScanError> {
    if !address::is_filing_root(root) {
        return Err(ScanError::NotJohnnyDecimalDirectory(root.to_path_buf()));
    }
    let mut areas = Vec::new();
    for child in sorted_children(root) {
        let Some(name) = entry_name(&child) else { continue };
        if !child.is_dir() || !address::is_area_name(&name) {
            continue;
        }
        areas.push(scan_area(child, name));
    }
    Ok(FilingTree {
        root: root.to_path_buf(),
        areas,
        broken_symlinks: OnceCell::new(),
    })
}

/// Locate the filing root by walking up from `start` (bounded by
/// `boundary`), then scan it.
pub fn load_from(start: &Path, boundary: &Path) -> Result<FilingTree, ScanError> {
    let root = address::find_root(start, boundary)?;
    load(&root)
}

fn scan_area(path: PathBuf, name: String) -> AreaNode {
    let (number, end_number, name) = match classify(&name) {
        Some(Address::Area {
            number,
            end_number,
            name,
        }) => (number, end_number, name),
        // Permissive fallback: a malformed area keeps its literal name
        // and lands in the 00-09 band.
        _ => (0, 9, name),
    };
    let mut categories = Vec::new();
    for child in sorted_children(&path) {
        let Some(child_name) = entry_name(&child) else {
            continue;
        };
        if !child.is_dir() || !address::is_category_name(&child_name) {
            continue;
        }
        categories.push(scan_category(child, child_name));
    }
    AreaNode {
        path,
        number,
        end_number,
        name,
        categories,
    }
}

fn scan_category(path: PathBuf, name: String) -> CategoryNode {
    let (number, name) = match classify(&name) {
        Some(Address::Category { number, name }) => (number, name),
        _ => (0, name),
    };
    let mut ids = Vec::new();
    for child in sorted_children(&path) {
        let Some(child_name) = entry_name(&child) else {
            continue;
        };
        if !address::is_id_name(&child_name) {
            continue;
        }
        if child.is_dir() {
            ids.push(id_node(child, child_name, false));
        } else if child.is_file() {
            ids.push(id_node(child, child_name, true));
        }
        // A symlink resolving to neither is skipped, like every level.
    }
    CategoryNode {
        path,
        number,
        name,
        ids,
    }
}

fn id_node(path: PathBuf, name: String, is_file: bool) -> IdNode {
    let (category, sequence, name) = match classify(&name) {
        Some(Address::Id {
            category,
            sequence,
            name,
        }) => (category, sequence, name),
        _ => (0, 0, name),
    };
    IdNode {
        path,
        category,
        sequence,
        name,
        is_file,
    }
}

/// Immediate children of `dir` in lexicographic name order. Unreadable
/// entries are dropped rather than failing the scan.
pub(crate) fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .collect()
}

fn entry_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// A symlink is valid when its target resolves; non-symlinks are always
/// valid.
pub(crate) fn symlink_ok(path: &Path) -> bool {
    if path.is_symlink() {
        std::fs::metadata(path).is_ok()
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_root(temp: &TempDir) -> PathBuf {
        let root = temp.path().to_path_buf();
        for dir in [
            "00-09 Meta/00 Indices/00.00",
            "10-19 Personal/11 Projects/11.01 Unsorted",
            "20-29 Family/26 Recipes/26.00",
            "20-29 Family/26 Recipes/26.01 Unsorted",
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        root
    }

    #[test]
    fn test_load_builds_nested_structure() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);

        let tree = load(&root).unwrap();
        assert_eq!(tree.areas().len(), 3);

        let family = &tree.areas()[2];
        assert_eq!(family.number, 20);
        assert_eq!(family.end_number, 29);
        assert_eq!(family.name, "Family");
        assert_eq!(family.categories.len(), 1);

        let recipes = &family.categories[0];
        assert_eq!(recipes.number, 26);
        assert_eq!(recipes.ids.len(), 2);
        assert_eq!(recipes.ids[0].id_str(), "26.00");
        assert_eq!(recipes.ids[0].name, "");
        assert_eq!(recipes.ids[1].id_str(), "26.01");
    }

    #[test]
    fn test_load_rejects_non_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20-29 Family")).unwrap();
        assert!(load(temp.path()).is_err());
    }

    #[test]
    fn test_load_skips_orphan_directories() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::create_dir(root.join("FabFilter")).unwrap();
        fs::create_dir(root.join("20-29 Family/Zoom")).unwrap();

        let tree = load(&root).unwrap();
        assert_eq!(tree.areas().len(), 3);
        assert_eq!(tree.areas()[2].categories.len(), 1);
    }

    #[test]
    fn test_id_files_are_picked_up() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::write(root.join("20-29 Family/26 Recipes/26.02 Shopping list"), "milk").unwrap();

        let tree = load(&root).unwrap();
        let recipes = &tree.areas()[2].categories[0];
        assert_eq!(recipes.ids.len(), 3);
        assert!(recipes.ids[2].is_file);
    }

    #[test]
    #[cfg(unix)]
    fn test_broken_symlinked_area_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        std::os::unix::fs::symlink(
            temp.path().join("does-not-exist"),
            root.join("30-39 External"),
        )
        .unwrap();

        let tree = load(&root).unwrap();
        assert_eq!(tree.areas().len(), 3);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);

        let first = load(&root).unwrap();
        let second = load(&root).unwrap();
        let names = |tree: &FilingTree| -> Vec<String> {
            tree.areas()
                .iter()
                .flat_map(|a| a.categories.iter())
                .flat_map(|c| c.ids.iter())
                .map(|id| id.id_str())
                .collect()
        };
        assert_eq!(names(&first), names(&second));
    }
}
