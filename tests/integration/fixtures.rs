//! Shared filesystem fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Build the reference filing system used across the integration suite:
/// three areas, a meta category, and a populated Recipes category.
pub fn sample_system(base: &Path) -> PathBuf {
    let root = base.join("Documents");
    for dir in [
        "00-09 Meta/00 Indices/00.00",
        "00-09 Meta/00 Indices/00.01 Unsorted",
        "10-19 Personal/11 Projects/11.00",
        "10-19 Personal/11 Projects/11.01 Unsorted",
        "20-29 Family/20 Meta - Family/20.00",
        "20-29 Family/20 Meta - Family/20.01 Unsorted",
        "20-29 Family/26 Recipes/26.00",
        "20-29 Family/26 Recipes/26.01 Unsorted",
    ] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    root
}

/// Write a policy document into the named meta directory.
pub fn write_policy(root: &Path, meta_dir: &str, contents: &str) {
    fs::write(root.join(meta_dir).join("policy.yaml"), contents).unwrap();
}
