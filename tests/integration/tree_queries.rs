//! End-to-end tree loading and query behavior.

use crate::integration::fixtures::sample_system;
use johnnydecimal::address::find_root;
use johnnydecimal::tree;
use johnnydecimal::validate;
use tempfile::TempDir;

#[test]
fn test_root_discovery_and_category_lookup() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    // Discovery walks up from deep inside the tree to the root.
    let start = root.join("20-29 Family/26 Recipes/26.01 Unsorted");
    let found = find_root(&start, temp.path()).unwrap();
    assert_eq!(found, root);

    let tree = tree::load(&found).unwrap();
    let recipes = tree.find_by_category(26).unwrap();
    assert_eq!(recipes.category.name, "Recipes");
    assert_eq!(recipes.category.next_available_sequence(), Some(2));
}

#[test]
fn test_full_snapshot_round_trips_through_json() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    let tree = tree::load(&root).unwrap();

    let snapshot = johnnydecimal::views::snapshot(&tree);
    let json = serde_json::to_string(&snapshot).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["areas"].as_array().unwrap().len(), 3);
    let family = &value["areas"][2];
    assert_eq!(family["number"], 20);
    assert_eq!(family["categories"][1]["ids"][1]["id"], "26.01");
    assert_eq!(family["categories"][1]["ids"][1]["mismatched"], false);
}

#[test]
fn test_validate_flags_planted_anomalies() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    // A duplicate of 26.01 in another category, which is also mismatched
    // there.
    std::fs::create_dir_all(root.join("10-19 Personal/11 Projects/26.01 Copy")).unwrap();
    // An orphan at category level.
    std::fs::create_dir(root.join("20-29 Family/26 Recipes/untitled folder")).unwrap();

    let tree = tree::load(&root).unwrap();
    let report = validate::validate(&tree);

    let issue_codes: Vec<&str> = report.issues().map(|f| f.code).collect();
    assert!(issue_codes.contains(&"duplicate-id"));
    assert!(issue_codes.contains(&"mismatched-prefix"));
    let warning_codes: Vec<&str> = report.warnings().map(|f| f.code).collect();
    assert!(warning_codes.contains(&"orphan"));
}

#[test]
fn test_search_spans_all_levels() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    let tree = tree::load(&root).unwrap();

    let hits = tree.search("meta", false);
    // Area "00-09 Meta" and category "20 Meta - Family".
    assert!(hits.len() >= 2);
    let hits = tree.search("unsorted", false);
    assert_eq!(hits.len(), 4);
}
