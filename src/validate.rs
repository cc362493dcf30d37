//! System consistency checks.
//!
//! Read-only scan producing findings split into issues (should fix) and
//! warnings (consider fixing). Convention checks honor the resolved
//! policy at each location, so a category that disables `meta_id` is not
//! nagged about a missing `xx.00`.

use crate::address::format_id;
use crate::policy;
use crate::tree::builder::sorted_children;
use crate::tree::FilingTree;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static ARCHIVE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.99($|\s)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Issue,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Issue)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    fn issue(&mut self, code: &'static str, message: String) {
        self.findings.push(Finding {
            severity: Severity::Issue,
            code,
            message,
        });
    }

    fn warning(&mut self, code: &'static str, message: String) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            code,
            message,
        });
    }
}

/// Run every consistency check over a tree snapshot.
pub fn validate(tree: &FilingTree) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicates(tree, &mut report);
    check_mismatched_prefixes(tree, &mut report);
    check_broken_symlinks(tree, &mut report);
    check_orphans(tree, &mut report);
    check_meta_categories(tree, &mut report);
    check_meta_and_unsorted_ids(tree, &mut report);
    check_symlink_bindings(tree, &mut report);
    check_ids_files_only(tree, &mut report);
    check_file_ids(tree, &mut report);
    check_dash_style(tree, &mut report);

    report
}

fn check_duplicates(tree: &FilingTree, report: &mut ValidationReport) {
    for dupe in tree.find_duplicates() {
        report.issue(
            "duplicate-id",
            format!(
                "duplicate ID {}:\n     {}\n     {}",
                dupe.id,
                dupe.first.display(),
                dupe.duplicate.display()
            ),
        );
    }
}

fn check_mismatched_prefixes(tree: &FilingTree, report: &mut ValidationReport) {
    for id in tree.all_ids() {
        if id.is_mismatched() {
            report.issue(
                "mismatched-prefix",
                format!(
                    "{} is inside category {:02} ({})\n     {}",
                    id.id.id_str(),
                    id.category.number,
                    id.category.name,
                    id.id.path.display()
                ),
            );
        }
    }
}

fn check_broken_symlinks(tree: &FilingTree, report: &mut ValidationReport) {
    for broken in tree.broken_symlinks() {
        report.warning("broken-symlink", format!("broken symlink: {}", broken.display()));
    }
}

fn check_orphans(tree: &FilingTree, report: &mut ValidationReport) {
    for orphan in tree.find_orphans() {
        let Some(parent) = orphan.parent() else {
            continue;
        };
        let parent_name = parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Unfiled items are expected inside capture categories.
        let capture = policy::resolve(parent, tree.root())
            .conventions()
            .capture_category;
        let parent_number = parent_name.get(..2).unwrap_or("");
        let parent_label = parent_name.get(3..).map(str::to_lowercase).unwrap_or_default();
        if parent_number == capture || parent_label == "inbox" || parent_label == "capture" {
            continue;
        }
        // Anything under an archive is left alone too.
        let in_archive = orphan.ancestors().any(|a| {
            a.file_name()
                .map(|n| ARCHIVE_NAME_RE.is_match(&n.to_string_lossy()))
                .unwrap_or(false)
        });
        if in_archive {
            continue;
        }
        report.warning("orphan", format!("orphan: {}", orphan.display()));
    }
}

fn check_meta_categories(tree: &FilingTree, report: &mut ValidationReport) {
    for area in tree.areas() {
        if area.number == 0 {
            // 00-09 Meta is the exception.
            continue;
        }
        if !policy::resolve(&area.path, tree.root()).convention_bool("meta_category", true) {
            continue;
        }
        match tree.find_by_category(area.number) {
            Some(meta_cat) => {
                if !meta_cat.category.name.starts_with("Meta - ") {
                    report.warning(
                        "meta-category",
                        format!(
                            "category {:02} should be \"Meta - {}\" but is \"{}\"\n     {}",
                            area.number,
                            area.name,
                            meta_cat.category.name,
                            meta_cat.category.path.display()
                        ),
                    );
                }
            }
            None => report.warning(
                "meta-category",
                format!("area {} has no meta category ({:02})", area, area.number),
            ),
        }
    }
}

fn check_meta_and_unsorted_ids(tree: &FilingTree, report: &mut ValidationReport) {
    for area in tree.areas() {
        for category in &area.categories {
            let resolved = policy::resolve(&category.path, tree.root());

            if resolved.convention_bool("meta_id", true) {
                let meta_id = format_id(category.number, 0);
                if tree.find_by_id(&meta_id).is_none() {
                    report.warning(
                        "missing-meta-id",
                        format!("category {} missing {} (category meta)", category, meta_id),
                    );
                }
            }

            if resolved.convention_bool("unsorted_id", true) {
                let unsorted_id = format_id(category.number, 1);
                match tree.find_by_id(&unsorted_id) {
                    Some(unsorted) if unsorted.id.name != "Unsorted" => report.warning(
                        "unsorted-name",
                        format!(
                            "{} should be \"Unsorted\" but is \"{}\"\n     {}",
                            unsorted_id,
                            unsorted.id.name,
                            unsorted.id.path.display()
                        ),
                    ),
                    Some(_) => {}
                    None => report.warning(
                        "missing-unsorted",
                        format!("category {} missing {} Unsorted", category, unsorted_id),
                    ),
                }
            }
        }
    }
}

fn check_symlink_bindings(tree: &FilingTree, report: &mut ValidationReport) {
    for area in tree.areas() {
        let resolved = policy::resolve(&area.path, tree.root());
        for binding in resolved.symlink_bindings() {
            let expected = expand_tilde(&binding.target);
            match tree.find_by_category(binding.category) {
                Some(cat) => {
                    if cat.category.path.is_symlink() {
                        let actual = cat
                            .category
                            .path
                            .canonicalize()
                            .unwrap_or_else(|_| cat.category.path.clone());
                        let expected_resolved =
                            expected.canonicalize().unwrap_or_else(|_| expected.clone());
                        if actual != expected_resolved {
                            report.issue(
                                "symlink-mismatch",
                                format!(
                                    "{} points to {}\n     policy expects: {}",
                                    cat.category,
                                    actual.display(),
                                    expected_resolved.display()
                                ),
                            );
                        }
                    } else {
                        report.warning(
                            "not-a-symlink",
                            format!(
                                "{} should be symlinked to {} (declared in {} policy)",
                                cat.category,
                                expected.display(),
                                area
                            ),
                        );
                    }
                }
                None => report.warning(
                    "symlink-missing",
                    format!(
                        "category {:02} declared as symlink to {} but doesn't exist",
                        binding.category,
                        expected.display()
                    ),
                ),
            }
        }
    }
}

fn check_ids_files_only(tree: &FilingTree, report: &mut ValidationReport) {
    for id in tree.all_ids() {
        if id.id.is_file {
            continue;
        }
        let resolved = policy::resolve(&id.id.path, tree.root());
        if !resolved.convention_bool("ids_files_only", false) {
            continue;
        }
        let subdirs: Vec<String> = sorted_children(&id.id.path)
            .into_iter()
            .filter(|child| child.is_dir())
            .filter_map(|child| child.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| !name.starts_with('.'))
            .collect();
        if subdirs.is_empty() {
            continue;
        }
        let mut names = subdirs[..subdirs.len().min(3)].join(", ");
        if subdirs.len() > 3 {
            names.push_str(&format!(" (+{} more)", subdirs.len() - 3));
        }
        report.warning(
            "subdirs-in-id",
            format!(
                "{} {} contains directories: {}\n     {}\n     (policy ids_files_only=true)",
                id.id.id_str(),
                id.id.name,
                names,
                id.id.path.display()
            ),
        );
    }
}

fn check_file_ids(tree: &FilingTree, report: &mut ValidationReport) {
    for id in tree.all_ids() {
        if !id.id.is_file {
            continue;
        }
        let resolved = policy::resolve(&id.category.path, tree.root());
        if !resolved.convention_bool("ids_as_files", false) {
            report.issue(
                "file-as-id",
                format!(
                    "{} {} is a file, not a directory\n     {}\n     (policy ids_as_files=false)",
                    id.id.id_str(),
                    id.id.name,
                    id.id.path.display()
                ),
            );
        }
    }
}

fn check_dash_style(tree: &FilingTree, report: &mut ValidationReport) {
    for area in tree.areas() {
        let name = area
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains('–') {
            report.warning(
                "en-dash",
                format!("{} uses en-dash instead of hyphen", name),
            );
        }
    }
}

fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(user_dirs) = directories::UserDirs::new() {
            return user_dirs.home_dir().join(rest);
        }
    }
    path.to_path_buf()
}
