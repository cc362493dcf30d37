//! Tree queries: lookups, anomaly scans, and name search.

use crate::address;
use crate::tree::builder::{sorted_children, symlink_ok};
use crate::tree::{AreaNode, CategoryNode, FilingTree, IdNode};
use std::collections::HashMap;
use std::path::PathBuf;

/// A category together with its owning area. Borrowed view; the tree
/// remains the sole owner of all nodes.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRef<'a> {
    pub area: &'a AreaNode,
    pub category: &'a CategoryNode,
}

/// An ID together with its owning category and area.
#[derive(Debug, Clone, Copy)]
pub struct IdRef<'a> {
    pub area: &'a AreaNode,
    pub category: &'a CategoryNode,
    pub id: &'a IdNode,
}

impl IdRef<'_> {
    /// True when the ID's own category prefix differs from the category
    /// directory that contains it. An anomaly, not an error.
    pub fn is_mismatched(&self) -> bool {
        self.id.category != self.category.number
    }
}

/// A duplicate ID observation: the first path seen for the ID string,
/// paired with a later occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub first: PathBuf,
    pub duplicate: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Area,
    Category,
    Id,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub kind: HitKind,
    pub label: String,
    pub path: PathBuf,
}

impl FilingTree {
    /// Exact match of an ID's canonical "xx.yy" form; first match in tree
    /// order wins (uniqueness is not guaranteed).
    pub fn find_by_id(&self, id_str: &str) -> Option<IdRef<'_>> {
        self.all_ids().into_iter().find(|r| r.id.id_str() == id_str)
    }

    /// First category across all areas with the given number.
    pub fn find_by_category(&self, number: u8) -> Option<CategoryRef<'_>> {
        for area in self.areas() {
            for category in &area.categories {
                if category.number == number {
                    return Some(CategoryRef { area, category });
                }
            }
        }
        None
    }

    /// The area whose band contains `number`.
    pub fn area_containing(&self, number: u8) -> Option<&AreaNode> {
        self.areas()
            .iter()
            .find(|a| a.number <= number && number <= a.end_number)
    }

    /// Every ID in the system, in tree order.
    pub fn all_ids(&self) -> Vec<IdRef<'_>> {
        let mut out = Vec::new();
        for area in self.areas() {
            for category in &area.categories {
                for id in &category.ids {
                    out.push(IdRef { area, category, id });
                }
            }
        }
        out
    }

    /// Duplicate ID strings across the system. Single pass: the first
    /// path per ID string is recorded, every later occurrence is reported
    /// paired with it.
    pub fn find_duplicates(&self) -> Vec<DuplicateId> {
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut dupes = Vec::new();
        for id_ref in self.all_ids() {
            let id = id_ref.id.id_str();
            match seen.get(&id) {
                Some(first) => dupes.push(DuplicateId {
                    id,
                    first: first.clone(),
                    duplicate: id_ref.id.path.clone(),
                }),
                None => {
                    seen.insert(id, id_ref.id.path.clone());
                }
            }
        }
        dupes
    }

    /// Non-dot directories that parse as neither category nor ID at area
    /// level, nor as ID at category level. Does not recurse below IDs.
    pub fn find_orphans(&self) -> Vec<PathBuf> {
        let mut orphans = Vec::new();
        for area in self.areas() {
            for child in sorted_children(&area.path) {
                let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if !child.is_dir() || name.starts_with('.') {
                    continue;
                }
                if !address::is_category_name(name) && !address::is_id_name(name) {
                    orphans.push(child.clone());
                }
            }
            for category in &area.categories {
                for child in sorted_children(&category.path) {
                    let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if !child.is_dir() || name.starts_with('.') {
                        continue;
                    }
                    if !address::is_id_name(name) {
                        orphans.push(child.clone());
                    }
                }
            }
        }
        orphans
    }

    /// Symlinks at area and category level whose target does not resolve.
    /// Computed lazily and memoized for the lifetime of this snapshot.
    pub fn broken_symlinks(&self) -> &[PathBuf] {
        self.broken_symlinks.get_or_init(|| {
            let mut broken = Vec::new();
            for area in self.areas() {
                for child in sorted_children(&area.path) {
                    if child.is_symlink() && !symlink_ok(&child) {
                        broken.push(child);
                    }
                }
                for category in &area.categories {
                    for child in sorted_children(&category.path) {
                        if child.is_symlink() && !symlink_ok(&child) {
                            broken.push(child);
                        }
                    }
                }
            }
            broken
        })
    }

    /// Case-insensitive name search over areas, categories, and IDs.
    /// Archived entries (sequence 99) are skipped unless requested.
    pub fn search(&self, query: &str, include_archived: bool) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for area in self.areas() {
            if area.name.to_lowercase().contains(&needle) {
                hits.push(SearchHit {
                    kind: HitKind::Area,
                    label: area.to_string(),
                    path: area.path.clone(),
                });
            }
            for category in &area.categories {
                if category.name.to_lowercase().contains(&needle) {
                    hits.push(SearchHit {
                        kind: HitKind::Category,
                        label: category.to_string(),
                        path: category.path.clone(),
                    });
                }
                for id in &category.ids {
                    if !include_archived && id.sequence == 99 {
                        continue;
                    }
                    if id.name.to_lowercase().contains(&needle) {
                        hits.push(SearchHit {
                            kind: HitKind::Id,
                            label: id.to_string(),
                            path: id.path.clone(),
                        });
                    }
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::load;
    use std::fs;
    use tempfile::TempDir;

    fn sample_root(temp: &TempDir) -> PathBuf {
        let root = temp.path().to_path_buf();
        for dir in [
            "00-09 Meta/00 Indices/00.00",
            "10-19 Personal/11 Projects/11.01 Unsorted",
            "20-29 Family/26 Recipes/26.00",
            "20-29 Family/26 Recipes/26.01 Unsorted",
            "20-29 Family/26 Recipes/26.05 Desserts",
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        root
    }

    #[test]
    fn test_find_by_id_and_category() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let tree = load(&root).unwrap();

        let id = tree.find_by_id("26.01").unwrap();
        assert_eq!(id.id.name, "Unsorted");
        assert_eq!(id.category.number, 26);

        let cat = tree.find_by_category(26).unwrap();
        assert_eq!(cat.category.name, "Recipes");
        assert_eq!(cat.area.number, 20);

        assert!(tree.find_by_id("99.99").is_none());
        assert!(tree.find_by_category(99).is_none());
    }

    #[test]
    fn test_next_available_sequence_fills_gaps() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let tree = load(&root).unwrap();

        // Sequences {0, 1, 5} are used; the smallest free slot is 2.
        let cat = tree.find_by_category(26).unwrap();
        assert_eq!(cat.category.next_available_sequence(), Some(2));
    }

    #[test]
    fn test_duplicate_ids_reported_once_per_pair() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::create_dir_all(root.join("10-19 Personal/11 Projects/30.02 One")).unwrap();
        fs::create_dir_all(root.join("20-29 Family/26 Recipes/30.02 Two")).unwrap();
        let tree = load(&root).unwrap();

        let dupes = tree.find_duplicates();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].id, "30.02");
        assert!(dupes[0].first.ends_with("30.02 One"));
        assert!(dupes[0].duplicate.ends_with("30.02 Two"));
    }

    #[test]
    fn test_mismatched_prefix_detected() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::create_dir_all(root.join("20-29 Family/26 Recipes/31.01 Stray")).unwrap();
        let tree = load(&root).unwrap();

        let stray = tree.find_by_id("31.01").unwrap();
        assert!(stray.is_mismatched());
        let ok = tree.find_by_id("26.01").unwrap();
        assert!(!ok.is_mismatched());
    }

    #[test]
    fn test_orphans_found_at_both_levels() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::create_dir(root.join("20-29 Family/Zoom")).unwrap();
        fs::create_dir(root.join("20-29 Family/26 Recipes/loose notes")).unwrap();
        fs::create_dir(root.join("20-29 Family/.hidden")).unwrap();
        let tree = load(&root).unwrap();

        let orphans = tree.find_orphans();
        assert_eq!(orphans.len(), 2);
        assert!(orphans.iter().any(|p| p.ends_with("Zoom")));
        assert!(orphans.iter().any(|p| p.ends_with("loose notes")));
    }

    #[test]
    #[cfg(unix)]
    fn test_broken_symlinks_collected() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        std::os::unix::fs::symlink(
            temp.path().join("gone"),
            root.join("20-29 Family/92 External"),
        )
        .unwrap();
        let tree = load(&root).unwrap();

        let broken = tree.broken_symlinks();
        assert_eq!(broken.len(), 1);
        assert!(broken[0].ends_with("92 External"));
        // Memoized: a second call yields the same slice.
        assert_eq!(tree.broken_symlinks().len(), 1);
    }

    #[test]
    fn test_search_skips_archived_by_default() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        fs::create_dir_all(root.join("20-29 Family/26 Recipes/26.99 Archive")).unwrap();
        let tree = load(&root).unwrap();

        assert!(tree.search("archive", false).is_empty());
        assert_eq!(tree.search("archive", true).len(), 1);
        assert_eq!(tree.search("desserts", false).len(), 1);
        assert_eq!(tree.search("recipes", false).len(), 1);
    }
}
