//! CLI route: run context and the single dispatch table.
//!
//! Dispatches to domain services and formats their outcomes. The filing
//! tree is rebuilt per command (it is a snapshot, not a live view); the
//! scope manifest is loaded once per invocation.

use crate::cli::output;
use crate::cli::parse::{Commands, NewCommands, PolicyCommands};
use crate::config::JdConfig;
use crate::error::OpError;
use crate::ops;
use crate::policy;
use crate::scope::ScopeManifest;
use crate::tree::{self, FilingTree};
use crate::validate;
use crate::views;
use std::path::PathBuf;
use tracing::debug;

/// Runtime context for CLI execution: resolved filing root and the
/// process-wide scope manifest.
pub struct RunContext {
    root: PathBuf,
    scope: ScopeManifest,
}

impl RunContext {
    /// Resolve the filing root (CLI flag, config, Documents, working
    /// directory, in that order) and load the scope manifest.
    pub fn new(root_override: Option<PathBuf>, config: &JdConfig) -> Result<Self, OpError> {
        let root = resolve_root(root_override.or_else(|| config.root.clone()))?;
        debug!("filing root: {}", root.display());
        Ok(Self {
            root,
            scope: ScopeManifest::load(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn tree(&self) -> Result<FilingTree, OpError> {
        Ok(tree::load(&self.root)?)
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, OpError> {
        match command {
            Commands::Index {
                category,
                all,
                area,
            } => {
                let tree = self.tree()?;
                if category.is_none() && !all && area.is_none() {
                    return Ok(output::format_area_summary(&tree));
                }
                let filter = views::IndexFilter {
                    category: *category,
                    area_digit: *area,
                };
                Ok(views::render_index(&tree, filter))
            }
            Commands::Which { address } => {
                let tree = self.tree()?;
                if let Some(id) = tree.find_by_id(address) {
                    return Ok(id.id.path.display().to_string());
                }
                if let Some(cat) = address
                    .parse::<u8>()
                    .ok()
                    .and_then(|n| tree.find_by_category(n))
                {
                    return Ok(cat.category.path.display().to_string());
                }
                Err(OpError::AddressNotFound(address.clone()))
            }
            Commands::Search { query, archived } => {
                let tree = self.tree()?;
                Ok(output::format_search(&tree.search(query, *archived), query))
            }
            Commands::Root => Ok(self.root.display().to_string()),
            Commands::New { command } => match command {
                NewCommands::Id {
                    category,
                    name,
                    at,
                    dry_run,
                } => {
                    let tree = self.tree()?;
                    let created =
                        ops::create::new_id(&tree, &self.scope, *category, name, *at, *dry_run)?;
                    Ok(output::format_created_id(&created))
                }
                NewCommands::Category {
                    area,
                    name,
                    at,
                    no_init,
                    dry_run,
                } => {
                    let tree = self.tree()?;
                    let created = ops::create::new_category(
                        &tree,
                        &self.scope,
                        *area,
                        name,
                        *at,
                        !no_init,
                        *dry_run,
                    )?;
                    Ok(output::format_created_category(&created))
                }
            },
            Commands::Add {
                source,
                id,
                copy,
                dry_run,
            } => {
                let tree = self.tree()?;
                let outcome = ops::add::add(&tree, &self.scope, source, id, *copy, *dry_run)?;
                Ok(output::format_add(&outcome))
            }
            Commands::Init {
                category,
                no_meta,
                no_unsorted,
            } => {
                let tree = self.tree()?;
                let outcome = ops::create::init_category(
                    &tree,
                    &self.scope,
                    *category,
                    !no_meta,
                    !no_unsorted,
                    false,
                )?;
                Ok(output::format_init(&outcome))
            }
            Commands::InitAll {
                no_meta,
                no_unsorted,
                dry_run,
            } => {
                let tree = self.tree()?;
                let outcome = ops::create::init_all(
                    &tree,
                    &self.scope,
                    !no_meta,
                    !no_unsorted,
                    *dry_run,
                )?;
                Ok(output::format_init_all(&outcome))
            }
            Commands::Mv {
                source,
                destination,
                archive,
                dry_run,
            } => {
                let tree = self.tree()?;
                if *archive {
                    if destination.is_some() {
                        return Err(OpError::InvalidTarget(
                            "--archive doesn't take a destination".to_string(),
                        ));
                    }
                    let outcome = ops::archive::archive(&tree, &self.scope, source, *dry_run)?;
                    return Ok(output::format_archive(&outcome));
                }
                let destination = destination.as_deref().ok_or_else(|| {
                    OpError::InvalidTarget(
                        "missing destination; use --archive or provide a destination".to_string(),
                    )
                })?;
                let outcome = ops::mv::mv(&tree, &self.scope, source, destination, *dry_run)?;
                Ok(output::format_move(&outcome))
            }
            Commands::Restore {
                target,
                renumber,
                dry_run,
            } => {
                let tree = self.tree()?;
                let outcome =
                    ops::archive::restore(&tree, &self.scope, target, *renumber, *dry_run)?;
                Ok(output::format_restore(&outcome))
            }
            Commands::Validate { format } => {
                let tree = self.tree()?;
                let report = validate::validate(&tree);
                output::format_validation(&report, format)
            }
            Commands::Triage { top, all } => {
                let tree = self.tree()?;
                let report = views::triage(&tree);
                Ok(output::format_triage(&report, *top, *all))
            }
            Commands::Json => {
                let tree = self.tree()?;
                serde_json::to_string_pretty(&views::snapshot(&tree))
                    .map_err(|err| OpError::Config(format!("cannot serialize snapshot: {}", err)))
            }
            Commands::GenerateIndex => {
                let tree = self.tree()?;
                let outcome = views::write_master_index(&tree)?;
                Ok(format!(
                    "Generated: {}\nGenerated: {}",
                    outcome.index_path.display(),
                    outcome.json_path.display()
                ))
            }
            Commands::Policy { command } => self.execute_policy(command),
            Commands::Scope => Ok(output::format_scope(&self.scope)),
        }
    }

    fn execute_policy(&self, command: &PolicyCommands) -> Result<String, OpError> {
        match command {
            PolicyCommands::Show { target, local } => {
                let tree = self.tree()?;
                let path = resolve_target_path(&tree, target.as_deref())?;
                if *local {
                    match policy::document::load_for(&path) {
                        Some(doc) => render_yaml(&serde_yaml::Value::Mapping(doc)),
                        None => Ok(format!("No policy document for {}", path.display())),
                    }
                } else {
                    let resolved = policy::resolve(&path, tree.root());
                    let rendered =
                        render_yaml(&serde_yaml::Value::Mapping(resolved.as_mapping().clone()))?;
                    Ok(format!("# Resolved policy for: {}\n{}", path.display(), rendered))
                }
            }
            PolicyCommands::Get { key, target } => {
                let tree = self.tree()?;
                let path = resolve_target_path(&tree, target.as_deref())?;
                let resolved = policy::resolve(&path, tree.root());
                match resolved.get(key) {
                    Some(value) => render_yaml(value).map(|s| s.trim_end().to_string()),
                    None => Err(OpError::AddressNotFound(format!("policy key {}", key))),
                }
            }
            PolicyCommands::Set { key, value, target } => {
                let tree = self.tree()?;
                let path = resolve_target_path(&tree, target.as_deref())?;
                let meta = policy::meta::find_meta_dir(&path).ok_or_else(|| {
                    OpError::Config(format!(
                        "no meta dir (xx.00) found for {}; run: jd init <category>",
                        path.display()
                    ))
                })?;
                let parsed = policy::document::parse_scalar(value);
                let document = policy::document::set_value(&meta, key, parsed)?;
                Ok(format!("Set {} at {}", key, document.display()))
            }
            PolicyCommands::Unset { key, target } => {
                let tree = self.tree()?;
                let path = resolve_target_path(&tree, target.as_deref())?;
                let meta = policy::meta::find_meta_dir(&path).ok_or_else(|| {
                    OpError::Config(format!("no meta dir (xx.00) found for {}", path.display()))
                })?;
                let outcome = policy::document::unset_value(&meta, key)?;
                if outcome.removed_document {
                    Ok(format!(
                        "Removed {} — policy document was empty, deleted {}",
                        key,
                        outcome.document.display()
                    ))
                } else {
                    Ok(format!("Removed {} from {}", key, outcome.document.display()))
                }
            }
            PolicyCommands::Where { target } => {
                let tree = self.tree()?;
                let path = resolve_target_path(&tree, target.as_deref())?;
                Ok(output::format_cascade(&policy::cascade_sources(
                    &path,
                    tree.root(),
                )))
            }
        }
    }
}

/// Resolve the filing root: explicit override first, then the user's
/// Documents directory, then the working directory, each by walking up
/// bounded at the home directory.
fn resolve_root(root_override: Option<PathBuf>) -> Result<PathBuf, OpError> {
    let boundary = directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/"));

    if let Some(start) = root_override {
        return Ok(crate::address::find_root(&start, &boundary)?);
    }
    if let Some(user_dirs) = directories::UserDirs::new() {
        if let Some(documents) = user_dirs.document_dir() {
            if let Ok(root) = crate::address::find_root(documents, &boundary) {
                return Ok(root);
            }
        }
    }
    let cwd = std::env::current_dir()?;
    Ok(crate::address::find_root(&cwd, &boundary)?)
}

/// Resolve a policy target: none means the root, else an ID, a bare
/// category number, or an existing path.
fn resolve_target_path(tree: &FilingTree, target: Option<&str>) -> Result<PathBuf, OpError> {
    let Some(target) = target else {
        return Ok(tree.root().to_path_buf());
    };
    if let Some(id) = tree.find_by_id(target) {
        return Ok(id.id.path.clone());
    }
    if let Some(cat) = target
        .parse::<u8>()
        .ok()
        .and_then(|n| tree.find_by_category(n))
    {
        return Ok(cat.category.path.clone());
    }
    let path = PathBuf::from(target);
    if path.exists() {
        return Ok(path);
    }
    Err(OpError::AddressNotFound(target.to_string()))
}

fn render_yaml(value: &serde_yaml::Value) -> Result<String, OpError> {
    serde_yaml::to_string(value)
        .map_err(|err| OpError::Config(format!("cannot render document: {}", err)))
}
