//! Cascade behavior across a real directory tree.

use crate::integration::fixtures::{sample_system, write_policy};
use johnnydecimal::policy;
use tempfile::TempDir;

#[test]
fn test_category_override_beats_defaults_and_stays_local() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    std::fs::create_dir_all(root.join("80-89 Archive/80 Software/80.00")).unwrap();
    std::fs::create_dir_all(root.join("80-89 Archive/80 Software/80.01 Unsorted")).unwrap();
    std::fs::create_dir_all(root.join("80-89 Archive/81 Hardware/81.01 Unsorted")).unwrap();
    write_policy(
        &root,
        "80-89 Archive/80 Software/80.00",
        "conventions:\n  ids_files_only: true\n",
    );

    let inside = policy::resolve(&root.join("80-89 Archive/80 Software/80.01 Unsorted"), &root);
    assert!(inside.convention_bool("ids_files_only", false));

    let sibling = policy::resolve(&root.join("80-89 Archive/81 Hardware/81.01 Unsorted"), &root);
    assert!(!sibling.convention_bool("ids_files_only", false));
}

#[test]
fn test_root_policy_cascades_down_and_category_wins() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    // Root-level document via the system meta chain.
    write_policy(
        &root,
        "00-09 Meta/00 Indices/00.00",
        "conventions:\n  ids_as_files: true\n  capture_category: \"02\"\n",
    );
    // Category-level override flips one key back.
    write_policy(
        &root,
        "20-29 Family/26 Recipes/26.00",
        "conventions:\n  ids_as_files: false\n",
    );

    let in_recipes = policy::resolve(&root.join("20-29 Family/26 Recipes/26.01 Unsorted"), &root);
    assert!(!in_recipes.convention_bool("ids_as_files", false));
    // The untouched key from the root document still applies.
    assert_eq!(in_recipes.convention_str("capture_category", "01"), "02");

    let in_projects = policy::resolve(&root.join("10-19 Personal/11 Projects/11.01 Unsorted"), &root);
    assert!(in_projects.convention_bool("ids_as_files", false));
}

#[test]
fn test_pattern_layer_applies_after_base_conventions() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    write_policy(
        &root,
        "20-29 Family/26 Recipes/26.00",
        concat!(
            "conventions:\n",
            "  ids_files_only: true\n",
            "patterns:\n",
            "  \"*.00\":\n",
            "    ids_files_only: false\n",
        ),
    );

    // The meta slot itself matches *.00, so the pattern wins there.
    let meta = policy::resolve(&root.join("20-29 Family/26 Recipes/26.00"), &root);
    assert!(!meta.convention_bool("ids_files_only", false));

    // A plain ID only gets the base conventions.
    let id = policy::resolve(&root.join("20-29 Family/26 Recipes/26.01 Unsorted"), &root);
    assert!(id.convention_bool("ids_files_only", false));
}

#[test]
fn test_get_convention_missing_segments_fall_back() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());

    let resolved = policy::resolve(&root.join("20-29 Family/26 Recipes"), &root);
    assert_eq!(resolved.convention_str("naming.separator", "?"), "-");
    assert_eq!(resolved.convention_str("naming.missing", "fallback"), "fallback");
    assert!(resolved.convention("does.not.exist").is_none());
}

#[test]
fn test_cascade_sources_lists_documents_in_chain_order() {
    let temp = TempDir::new().unwrap();
    let root = sample_system(temp.path());
    write_policy(
        &root,
        "20-29 Family/26 Recipes/26.00",
        "conventions: {}\n",
    );

    let levels = policy::cascade_sources(
        &root.join("20-29 Family/26 Recipes/26.01 Unsorted"),
        &root,
    );
    assert_eq!(levels.first().unwrap().dir, root);
    assert!(levels.last().unwrap().dir.ends_with("26.01 Unsorted"));
    // The category and ID levels both resolve to the 26.00 document.
    let with_docs = levels.iter().filter(|l| l.document.is_some()).count();
    assert_eq!(with_docs, 2);
}
