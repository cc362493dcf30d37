//! The archive/restore lifecycle: archive creates the .99 slot on
//! demand, restore reverses it and cleans up.

use crate::integration::fixtures::sample_system;
use johnnydecimal::error::OpError;
use johnnydecimal::ops;
use johnnydecimal::scope::ScopeManifest;
use johnnydecimal::tree;
use tempfile::TempDir;

const UNRESTRICTED: ScopeManifest = ScopeManifest::Unrestricted;

#[test]
fn test_id_archive_restore_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let tree_before = tree::load(&root).unwrap();
    let archived = ops::archive::archive(&tree_before, &UNRESTRICTED, "26.01", false).unwrap();
    assert!(archived.created_archive_dir);
    assert!(root
        .join("20-29 Family/26 Recipes/26.99 Archive/26.01 Unsorted")
        .is_dir());

    let tree_after = tree::load(&root).unwrap();
    assert!(tree_after.find_by_id("26.01").is_none());

    let restored = ops::archive::restore(&tree_after, &UNRESTRICTED, "26.01", false, false).unwrap();
    assert!(restored.removed_archive_dir);
    assert!(root.join("20-29 Family/26 Recipes/26.01 Unsorted").is_dir());
    assert!(!root.join("20-29 Family/26 Recipes/26.99 Archive").exists());
}

#[test]
fn test_restore_conflict_then_renumber() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let tree = tree::load(&root).unwrap();
    ops::archive::archive(&tree, &UNRESTRICTED, "26.01", false).unwrap();
    // The slot gets reused while the original is archived.
    std::fs::create_dir(root.join("20-29 Family/26 Recipes/26.01 New project")).unwrap();

    let tree = tree::load(&root).unwrap();
    let err = ops::archive::restore(&tree, &UNRESTRICTED, "26.01", false, false).unwrap_err();
    assert!(matches!(err, OpError::RestoreConflict { .. }));
    let report = err.to_string();
    assert!(report.contains("26.01"));
    assert!(report.contains("items"));

    let restored = ops::archive::restore(&tree, &UNRESTRICTED, "26.01", true, false).unwrap();
    assert_eq!(restored.renumbered.as_deref(), Some("26.02"));
    assert!(root.join("20-29 Family/26 Recipes/26.02 Unsorted").is_dir());
    // The archive dir emptied out and is gone.
    assert!(!root.join("20-29 Family/26 Recipes/26.99 Archive").exists());
}

#[test]
fn test_category_archive_into_area_meta_and_back() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let tree = tree::load(&root).unwrap();
    let archived = ops::archive::archive(&tree, &UNRESTRICTED, "26", false).unwrap();
    assert!(archived
        .dest
        .ends_with("20 Meta - Family/20.99 Archive/26 Recipes"));
    assert!(!root.join("20-29 Family/26 Recipes").exists());

    let tree = tree::load(&root).unwrap();
    ops::archive::restore(&tree, &UNRESTRICTED, "26", false, false).unwrap();
    assert!(root.join("20-29 Family/26 Recipes/26.01 Unsorted").is_dir());
}

#[test]
fn test_dry_run_previews_without_mutation() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let tree = tree::load(&root).unwrap();
    let outcome = ops::archive::archive(&tree, &UNRESTRICTED, "26.01", true).unwrap();
    assert!(outcome.dry_run);
    assert!(root.join("20-29 Family/26 Recipes/26.01 Unsorted").is_dir());
    assert!(!root.join("20-29 Family/26 Recipes/26.99 Archive").exists());

    // A dry-run restore still performs conflict detection.
    ops::archive::archive(&tree, &UNRESTRICTED, "26.01", false).unwrap();
    std::fs::create_dir(root.join("20-29 Family/26 Recipes/26.01 Taken")).unwrap();
    let tree = tree::load(&root).unwrap();
    let err = ops::archive::restore(&tree, &UNRESTRICTED, "26.01", false, true).unwrap_err();
    assert!(matches!(err, OpError::RestoreConflict { .. }));
}

#[test]
fn test_move_decision_tree_end_to_end() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let tree = tree::load(&root).unwrap();
    // Rename keeps the number.
    let renamed = ops::mv::mv(&tree, &UNRESTRICTED, "26.01", "Drafts", false).unwrap();
    assert_eq!(renamed.to_label, "26.01 Drafts");

    // Refile to another category takes the next available slot there.
    let tree = tree::load(&root).unwrap();
    let refiled = ops::mv::mv(&tree, &UNRESTRICTED, "26.01", "11", false).unwrap();
    assert_eq!(refiled.to_label, "11.02 Drafts");
    assert!(root.join("10-19 Personal/11 Projects/11.02 Drafts").is_dir());

    // Renumber back into Recipes at an explicit address.
    let tree = tree::load(&root).unwrap();
    let renumbered = ops::mv::mv(&tree, &UNRESTRICTED, "11.02", "26.05", false).unwrap();
    assert_eq!(renumbered.to_label, "26.05 Drafts");
    assert!(root.join("20-29 Family/26 Recipes/26.05 Drafts").is_dir());
}
