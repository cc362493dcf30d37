//! Scope gating across mutation operations.

use crate::integration::fixtures::sample_system;
use johnnydecimal::error::OpError;
use johnnydecimal::ops;
use johnnydecimal::scope::ScopeManifest;
use johnnydecimal::tree;
use tempfile::TempDir;

fn family_scope() -> ScopeManifest {
    ScopeManifest::Patterns(vec!["20-29".to_string()])
}

#[test]
fn test_manifest_band_allows_and_denies() {
    let scope = family_scope();
    assert!(scope.check("21").is_ok());
    assert!(scope.check("26.01").is_ok());

    let err = scope.check("30").unwrap_err();
    match err {
        OpError::OutOfScope(reason) => {
            assert!(reason.contains("30"));
            assert!(reason.contains("20-29"));
        }
        other => panic!("expected OutOfScope, got {:?}", other),
    }
}

#[test]
fn test_in_scope_mutations_proceed() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    let tree = tree::load(&root).unwrap();

    let created = ops::create::new_id(&tree, &family_scope(), 26, "Mediation", None, false).unwrap();
    assert_eq!(created.id, "26.02");
    assert!(created.path.is_dir());
}

#[test]
fn test_out_of_scope_mutations_never_touch_disk() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    let tree = tree::load(&root).unwrap();
    let scope = family_scope();

    assert!(matches!(
        ops::create::new_id(&tree, &scope, 11, "Nope", None, false),
        Err(OpError::OutOfScope(_))
    ));
    assert!(matches!(
        ops::archive::archive(&tree, &scope, "11.01", false),
        Err(OpError::OutOfScope(_))
    ));
    assert!(matches!(
        ops::mv::mv(&tree, &scope, "11.01", "Renamed", false),
        Err(OpError::OutOfScope(_))
    ));
    // Nothing moved or appeared.
    assert!(root.join("10-19 Personal/11 Projects/11.01 Unsorted").is_dir());
    assert!(!root.join("10-19 Personal/11 Projects/11.02 Nope").exists());
}

#[test]
fn test_scope_loaded_from_manifest_file() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("jd.yaml");
    std::fs::write(&manifest, "scope:\n  - \"42\"\n  - \"86.03\"\n").unwrap();

    let scope = ScopeManifest::from_file(&manifest);
    assert!(scope.check("42").is_ok());
    assert!(scope.check("42.17").is_ok());
    assert!(scope.check("86.03").is_ok());
    assert!(scope.check("86.04").is_err());
}

#[test]
fn test_missing_manifest_fails_open() {
    let temp = TempDir::new().unwrap();
    let scope = ScopeManifest::from_file(&temp.path().join("absent.yaml"));
    assert!(scope.is_unrestricted());
    assert!(scope.check("99.99").is_ok());
}

#[test]
fn test_reads_are_never_gated() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    let tree = tree::load(&root).unwrap();

    // Lookups and anomaly scans ignore scope entirely.
    assert!(tree.find_by_id("11.01").is_some());
    assert!(tree.find_duplicates().is_empty());
}
