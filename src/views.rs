//! Read-only renderings of the filing tree.
//!
//! Text index, machine-readable JSON snapshot, the generated Markdown
//! master index, and the triage report. These consume the tree read-only
//! and carry no invariants of their own.

use crate::error::OpError;
use crate::tree::{FilingTree, IdNode};
use serde::Serialize;
use std::path::PathBuf;

/// Machine-readable snapshot of the whole system (the `jd json` output).
#[derive(Debug, Serialize)]
pub struct SystemSnapshot {
    pub root: PathBuf,
    pub areas: Vec<AreaSnapshot>,
    pub broken_symlinks: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct AreaSnapshot {
    pub number: u8,
    pub end_number: u8,
    pub name: String,
    pub path: PathBuf,
    pub categories: Vec<CategorySnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CategorySnapshot {
    pub number: u8,
    pub name: String,
    pub path: PathBuf,
    pub ids: Vec<IdSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct IdSnapshot {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub is_symlink: bool,
    pub symlink_target: Option<PathBuf>,
    pub mismatched: bool,
}

/// Build the serializable snapshot of a tree.
pub fn snapshot(tree: &FilingTree) -> SystemSnapshot {
    SystemSnapshot {
        root: tree.root().to_path_buf(),
        areas: tree
            .areas()
            .iter()
            .map(|area| AreaSnapshot {
                number: area.number,
                end_number: area.end_number,
                name: area.name.clone(),
                path: area.path.clone(),
                categories: area
                    .categories
                    .iter()
                    .map(|category| CategorySnapshot {
                        number: category.number,
                        name: category.name.clone(),
                        path: category.path.clone(),
                        ids: category
                            .ids
                            .iter()
                            .map(|id| id_snapshot(id, category.number))
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
        broken_symlinks: tree.broken_symlinks().to_vec(),
    }
}

fn id_snapshot(id: &IdNode, containing_category: u8) -> IdSnapshot {
    let is_symlink = id.path.is_symlink();
    IdSnapshot {
        id: id.id_str(),
        name: id.name.clone(),
        path: id.path.clone(),
        is_symlink,
        symlink_target: is_symlink.then(|| {
            id.path
                .canonicalize()
                .unwrap_or_else(|_| id.path.clone())
        }),
        mismatched: id.category != containing_category,
    }
}

/// Filters for the text index.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexFilter {
    /// Restrict to the area with this leading digit (2 means 20-29).
    pub area_digit: Option<u8>,
    /// Restrict to a single category number.
    pub category: Option<u8>,
}

/// Render the index as indented text with anomaly markers.
pub fn render_index(tree: &FilingTree, filter: IndexFilter) -> String {
    let mut out = String::new();
    for area in tree.areas() {
        if let Some(digit) = filter.area_digit {
            if u16::from(area.number) != u16::from(digit) * 10 {
                continue;
            }
        }
        if let Some(category) = filter.category {
            if category < area.number || category > area.end_number {
                continue;
            }
        }
        out.push_str(&format!("{}\n", area));
        for cat in &area.categories {
            if let Some(category) = filter.category {
                if cat.number != category {
                    continue;
                }
            }
            out.push_str(&format!("  {}\n", cat));
            for id in &cat.ids {
                let mut marker = String::new();
                if id.category != cat.number {
                    marker.push_str(" [mismatched prefix]");
                }
                if id.path.is_symlink() {
                    let target = id.path.canonicalize().unwrap_or_else(|_| id.path.clone());
                    marker.push_str(&format!(" -> {}", target.display()));
                }
                out.push_str(&format!("    {}{}\n", id, marker));
            }
        }
    }
    out
}

/// Render the Markdown master index.
pub fn render_markdown_index(tree: &FilingTree) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Johnny.Decimal Master Index".to_string());
    lines.push(String::new());
    lines.push(format!(
        "> Generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    ));
    lines.push(format!("> Root: `{}`", tree.root().display()));
    lines.push(String::new());

    if !tree.broken_symlinks().is_empty() {
        lines.push("## Broken Symlinks".to_string());
        for path in tree.broken_symlinks() {
            lines.push(format!("- `{}`", path.display()));
        }
        lines.push(String::new());
    }

    lines.push("## Index".to_string());
    lines.push(String::new());
    for area in tree.areas() {
        lines.push(format!("### {}", area));
        for category in &area.categories {
            lines.push(format!("- **{}**", category));
            for id in &category.ids {
                let mut marker = String::new();
                if id.category != category.number {
                    marker.push_str(" (mismatched)");
                }
                if id.path.is_symlink() {
                    marker.push_str(" (symlink)");
                }
                lines.push(format!("  - {}{}", id, marker));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n") + "\n"
}

/// Files written by a master-index regeneration.
#[derive(Debug)]
pub struct MasterIndexOutcome {
    pub index_path: PathBuf,
    pub json_path: PathBuf,
}

/// Write the Markdown master index and JSON snapshot into the system
/// meta category (`00`).
pub fn write_master_index(tree: &FilingTree) -> Result<MasterIndexOutcome, OpError> {
    let meta_cat = tree
        .find_by_category(0)
        .ok_or_else(|| OpError::AddressNotFound("system meta category 00".to_string()))?;
    let index_path = meta_cat.category.path.join("00.00 Index.md");
    let json_path = meta_cat.category.path.join("jd.json");

    std::fs::write(&index_path, render_markdown_index(tree))?;
    let json = serde_json::to_string_pretty(&snapshot(tree))
        .map_err(|err| OpError::Config(format!("cannot serialize snapshot: {}", err)))?;
    std::fs::write(&json_path, json + "\n")?;

    Ok(MasterIndexOutcome {
        index_path,
        json_path,
    })
}

/// Where attention is needed most.
#[derive(Debug, Default, Serialize)]
pub struct TriageReport {
    /// (item count, category label, unsorted ID string), busiest first.
    pub unsorted: Vec<(usize, String, String)>,
    /// (ID label, category name) for IDs that are plain files.
    pub file_ids: Vec<(String, String)>,
    /// Categories with no real content beyond the reserved slots.
    pub empty_categories: Vec<String>,
}

/// Build the triage report: busiest `xx.01 Unsorted` directories, IDs
/// that are plain files, and categories holding nothing but their
/// reserved slots.
pub fn triage(tree: &FilingTree) -> TriageReport {
    let mut report = TriageReport::default();
    for area in tree.areas() {
        for category in &area.categories {
            if let Some(unsorted) = category.ids.iter().find(|id| id.sequence == 1) {
                if !unsorted.is_file {
                    let count = crate::ops::visible_item_count(&unsorted.path);
                    if count > 0 {
                        report
                            .unsorted
                            .push((count, category.to_string(), unsorted.id_str()));
                    }
                }
            }

            let has_real_ids = category
                .ids
                .iter()
                .any(|id| !matches!(id.sequence, 0 | 1 | 99));
            if !has_real_ids {
                report.empty_categories.push(category.to_string());
            }

            for id in &category.ids {
                if id.is_file {
                    report.file_ids.push((id.to_string(), category.name.clone()));
                }
            }
        }
    }
    report.unsorted.sort_by(|a, b| b.0.cmp(&a.0));
    report
}
