//! Meta-directory resolution.
//!
//! The meta directory for a location is the conventional `xx.00` slot of
//! its category. Resolution is a priority list over the location's own
//! name; any step that fails to find the expected directory on disk
//! yields "no meta dir", never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static META_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.00$").unwrap());
static ID_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})\.\d{2}").unwrap());
static CATEGORY_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2}) ").unwrap());
static AREA_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d)\d[-–]\d{2} ").unwrap());
static META_AREA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^00[-–]09 ").unwrap());

/// Find the meta directory (`xx.00`) governing `path`.
///
/// 1. `path` is itself an `xx.00`: it is the meta dir.
/// 2. `path` is an ID: the sibling `xx.00` in the same category.
/// 3. `path` is a category: the child `xx.00`.
/// 4. `path` is an area: the `x0` meta category's `x0.00`.
/// 5. otherwise (root): the `00-09` area's `00` category's `00.00`.
pub fn find_meta_dir(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_string_lossy();

    if META_NAME_RE.is_match(&name) {
        return Some(path.to_path_buf());
    }

    if let Some(caps) = ID_PREFIX_RE.captures(&name) {
        let meta = path.parent()?.join(format!("{}.00", &caps[1]));
        return meta.exists().then_some(meta);
    }

    if let Some(caps) = CATEGORY_PREFIX_RE.captures(&name) {
        let meta = path.join(format!("{}.00", &caps[1]));
        return meta.exists().then_some(meta);
    }

    if let Some(caps) = AREA_PREFIX_RE.captures(&name) {
        let meta_cat = format!("{}0", &caps[1]);
        let child = child_with_prefix(path, &format!("{} ", meta_cat))?;
        let meta = child.join(format!("{}.00", meta_cat));
        return meta.exists().then_some(meta);
    }

    // Root: 00-09 area, 00 category, 00.00.
    for area in children(path) {
        let Some(area_name) = area.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !area.is_dir() || !META_AREA_RE.is_match(&area_name) {
            continue;
        }
        if let Some(cat) = child_with_prefix(&area, "00 ") {
            let meta = cat.join("00.00");
            if meta.exists() {
                return Some(meta);
            }
        }
    }
    None
}

fn children(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    out.sort();
    out
}

fn child_with_prefix(dir: &Path, prefix: &str) -> Option<PathBuf> {
    children(dir).into_iter().find(|child| {
        child.is_dir()
            && child
                .file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
    })
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
            "20-29 Family/20 Meta - Family/20.00",
            "20-29 Family/26 Recipes/26.00",
            "20-29 Family/26 Recipes/26.01 Unsorted",
            "30-39 Work/31 Admin/31.01 Unsorted",
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        root
    }

    #[test]
    fn test_meta_dir_is_itself() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let meta = root.join("20-29 Family/26 Recipes/26.00");
        assert_eq!(find_meta_dir(&meta), Some(meta.clone()));
    }

    #[test]
    fn test_id_resolves_to_sibling_meta() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let id = root.join("20-29 Family/26 Recipes/26.01 Unsorted");
        assert_eq!(
            find_meta_dir(&id),
            Some(root.join("20-29 Family/26 Recipes/26.00"))
        );
    }

    #[test]
    fn test_category_resolves_to_child_meta() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let cat = root.join("20-29 Family/26 Recipes");
        assert_eq!(
            find_meta_dir(&cat),
            Some(root.join("20-29 Family/26 Recipes/26.00"))
        );
    }

    #[test]
    fn test_area_resolves_through_meta_category() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        let area = root.join("20-29 Family");
        assert_eq!(
            find_meta_dir(&area),
            Some(root.join("20-29 Family/20 Meta - Family/20.00"))
        );
    }

    #[test]
    fn test_root_resolves_to_system_meta() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        assert_eq!(
            find_meta_dir(&root),
            Some(root.join("00-09 Meta/00 Indices/00.00"))
        );
    }

    #[test]
    fn test_missing_meta_yields_none() {
        let temp = TempDir::new().unwrap();
        let root = sample_root(&temp);
        // 31 Admin has no 31.00.
        let id = root.join("30-39 Work/31 Admin/31.01 Unsorted");
        assert_eq!(find_meta_dir(&id), None);
        // 30-39 Work has no 30 meta category.
        assert_eq!(find_meta_dir(&root.join("30-39 Work")), None);
    }
}
