//! CLI output: error mapping and outcome formatting.

use crate::error::OpError;
use crate::ops::archive::{ArchiveOutcome, RestoreOutcome};
use crate::ops::add::AddOutcome;
use crate::ops::create::{CreatedCategory, CreatedId, InitAllOutcome, InitOutcome};
use crate::ops::mv::MoveOutcome;
use crate::policy::CascadeLevel;
use crate::scope::ScopeManifest;
use crate::tree::query::{HitKind, SearchHit};
use crate::tree::FilingTree;
use crate::validate::ValidationReport;
use crate::views::TriageReport;
use owo_colors::OwoColorize;

/// Map a domain error to a user-facing message.
pub fn map_error(err: &OpError) -> String {
    format!("{} {}", "error:".red().bold(), err)
}

fn prefix(dry_run: bool) -> &'static str {
    if dry_run {
        "(dry run) "
    } else {
        ""
    }
}

pub fn format_area_summary(tree: &FilingTree) -> String {
    let mut out = String::new();
    for area in tree.areas() {
        let categories = area.categories.len();
        let ids: usize = area.categories.iter().map(|c| c.ids.len()).sum();
        out.push_str(&format!(
            "{}  ({} categories, {} IDs)\n",
            area, categories, ids
        ));
    }
    out
}

pub fn format_search(hits: &[SearchHit], query: &str) -> String {
    if hits.is_empty() {
        return format!("No results for '{}'.", query);
    }
    let mut out = String::new();
    for hit in hits {
        let kind = match hit.kind {
            HitKind::Area => "area",
            HitKind::Category => "category",
            HitKind::Id => "id",
        };
        out.push_str(&format!("[{:>8}] {}\n           {}\n", kind, hit.label, hit.path.display()));
    }
    out
}

pub fn format_created_id(created: &CreatedId) -> String {
    let mut out = format!("{}Created: {}", prefix(created.dry_run), created.path.display());
    for note in &created.notes {
        out.push_str(&format!("\n  note: {}", note));
    }
    out
}

pub fn format_created_category(created: &CreatedCategory) -> String {
    let mut out = format!("{}Created: {}", prefix(created.dry_run), created.path.display());
    for child in &created.bootstrapped {
        out.push_str(&format!("\n  + {}", child));
    }
    out
}

pub fn format_add(outcome: &AddOutcome) -> String {
    let verb = if outcome.copied { "Copied" } else { "Added" };
    format!(
        "{}{}: {} -> {}",
        prefix(outcome.dry_run),
        verb,
        outcome.source.display(),
        outcome.dest.display()
    )
}

pub fn format_init(outcome: &InitOutcome) -> String {
    if outcome.created.is_empty() {
        return format!("{} already bootstrapped.", outcome.category);
    }
    let mut out = format!("{}{}", prefix(outcome.dry_run), outcome.category);
    for slot in &outcome.created {
        out.push_str(&format!("\n  created: {}", slot));
    }
    for slot in &outcome.existing {
        out.push_str(&format!("\n  exists:  {}", slot));
    }
    out
}

pub fn format_init_all(outcome: &InitAllOutcome) -> String {
    let mut out = String::new();
    for section in &outcome.sections {
        out.push_str(&format!("{}\n", section.category));
        for slot in &section.created {
            let verb = if outcome.dry_run {
                "would create"
            } else {
                "created"
            };
            out.push_str(&format!("  {}: {}\n", verb, slot));
        }
    }
    for skipped in &outcome.skipped_out_of_scope {
        out.push_str(&format!("  skipped (out of scope): {}\n", skipped));
    }
    if outcome.dry_run {
        out.push_str(&format!("\nWould create {} directories.", outcome.total_created));
    } else {
        out.push_str(&format!("\nCreated {} directories.", outcome.total_created));
    }
    out
}

pub fn format_move(outcome: &MoveOutcome) -> String {
    let mut out = format!(
        "{}{} -> {}",
        prefix(outcome.dry_run),
        outcome.from_label,
        outcome.to_label
    );
    if let Some((from, to)) = &outcome.moved_between {
        out.push_str(&format!("\n  (moved from {} to {})", from, to));
    }
    out
}

pub fn format_archive(outcome: &ArchiveOutcome) -> String {
    let mut out = String::new();
    if outcome.created_archive_dir {
        out.push_str(&format!(
            "  Created {}\n",
            outcome
                .archive_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
    }
    out.push_str(&format!(
        "{}Archived {} -> {}/",
        prefix(outcome.dry_run),
        outcome.item,
        outcome
            .archive_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    ));
    out
}

pub fn format_restore(outcome: &RestoreOutcome) -> String {
    let from = outcome
        .from
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let to = outcome
        .to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut out = match &outcome.renumbered {
        Some(_) => format!("{}Restored {} -> {} (renumbered)", prefix(outcome.dry_run), from, to),
        None => format!("{}Restored {}", prefix(outcome.dry_run), to),
    };
    if outcome.removed_archive_dir {
        out.push_str("\n  Removed empty archive directory");
    }
    out
}

pub fn format_validation(report: &ValidationReport, format: &str) -> Result<String, OpError> {
    if format == "json" {
        return serde_json::to_string_pretty(report)
            .map_err(|err| OpError::Config(format!("cannot serialize report: {}", err)));
    }

    if report.is_clean() {
        return Ok("No issues found!".to_string());
    }
    let mut out = String::new();
    let issues: Vec<_> = report.issues().collect();
    let warnings: Vec<_> = report.warnings().collect();
    if !issues.is_empty() {
        out.push_str(&format!("{}\n", "=== ISSUES (should fix) ===".red().bold()));
        for finding in &issues {
            out.push_str(&format!("{}\n", finding.message));
        }
        out.push('\n');
    }
    if !warnings.is_empty() {
        out.push_str(&format!(
            "{}\n",
            "=== WARNINGS (consider fixing) ===".yellow().bold()
        ));
        for finding in &warnings {
            out.push_str(&format!("{}\n", finding.message));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "Found {} issue(s) and {} warning(s).",
        issues.len(),
        warnings.len()
    ));
    Ok(out)
}

pub fn format_triage(report: &TriageReport, top: usize, show_all: bool) -> String {
    let mut out = String::new();
    let limit = |len: usize| if show_all { len } else { len.min(top) };

    if !report.unsorted.is_empty() {
        out.push_str("BUSIEST UNSORTED (items needing filing):\n");
        for (count, category, id) in &report.unsorted[..limit(report.unsorted.len())] {
            out.push_str(&format!("  {:4}  {} ({})\n", count, category, id));
        }
        if !show_all && report.unsorted.len() > top {
            out.push_str(&format!("  ... and {} more (use --all)\n", report.unsorted.len() - top));
        }
        out.push('\n');
    }

    if !report.file_ids.is_empty() {
        out.push_str(&format!("FILE-IDS ({} files acting as IDs):\n", report.file_ids.len()));
        for (label, category) in &report.file_ids[..limit(report.file_ids.len())] {
            out.push_str(&format!("       {}  ({})\n", label, category));
        }
        out.push('\n');
    }

    if !report.empty_categories.is_empty() {
        out.push_str(&format!(
            "EMPTY CATEGORIES ({} with no real content):\n",
            report.empty_categories.len()
        ));
        for category in &report.empty_categories[..limit(report.empty_categories.len())] {
            out.push_str(&format!("       {}\n", category));
        }
        out.push('\n');
    }

    let total: usize = report.unsorted.iter().map(|(count, _, _)| count).sum();
    out.push_str(&format!(
        "Total: {} unsorted items across {} categories",
        total,
        report.unsorted.len()
    ));
    out
}

pub fn format_cascade(levels: &[CascadeLevel]) -> String {
    let mut out = String::new();
    let mut found = false;
    for level in levels {
        let name = level
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| level.dir.display().to_string());
        match &level.document {
            Some(doc) => {
                found = true;
                let doc_name = doc
                    .strip_prefix(&level.dir)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| doc.display().to_string());
                out.push_str(&format!("  * {}/{}\n", name, doc_name));
            }
            None => out.push_str(&format!("    {}/\n", name)),
        }
    }
    if !found {
        out.push_str("\nNo policy documents found — using defaults only.");
    }
    out
}

pub fn format_scope(scope: &ScopeManifest) -> String {
    match scope {
        ScopeManifest::Unrestricted => "Scope: unrestricted".to_string(),
        ScopeManifest::Patterns(patterns) => {
            let mut out = String::from("Scope:\n");
            for pattern in patterns {
                out.push_str(&format!("  - {}\n", pattern));
            }
            out
        }
    }
}
