//! CLI parse: clap types for the jd binary. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Johnny Decimal CLI - manage your filing system
#[derive(Parser)]
#[command(name = "jd")]
#[command(about = "Manage a Johnny Decimal filing system")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Filing system root (default: discovered from Documents or the
    /// working directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the filing index
    Index {
        /// Category number to show (e.g. 26)
        category: Option<u8>,
        /// Show the full tree
        #[arg(long)]
        all: bool,
        /// Show an area by its leading digit (2 means 20-29)
        #[arg(long)]
        area: Option<u8>,
    },
    /// Resolve an ID (e.g. 26.01) or category number to its path
    Which {
        address: String,
    },
    /// Search entries by name (case-insensitive)
    Search {
        query: String,
        /// Include archived entries (xx.99)
        #[arg(long)]
        archived: bool,
    },
    /// Print the root directory of the filing system
    Root,
    /// Create new folders (auto-numbered by default)
    New {
        #[command(subcommand)]
        command: NewCommands,
    },
    /// Add a file or directory into an ID from outside the tree
    Add {
        source: PathBuf,
        id: String,
        /// Copy instead of move
        #[arg(long)]
        copy: bool,
        /// Show what would happen without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Bootstrap a category with xx.00 (meta) and xx.01 (Unsorted)
    Init {
        category: u8,
        /// Skip the xx.00 meta dir
        #[arg(long)]
        no_meta: bool,
        /// Skip the xx.01 Unsorted dir
        #[arg(long)]
        no_unsorted: bool,
    },
    /// Bootstrap all categories with xx.00 and xx.01
    InitAll {
        #[arg(long)]
        no_meta: bool,
        #[arg(long)]
        no_unsorted: bool,
        /// Show what would be created
        #[arg(long)]
        dry_run: bool,
    },
    /// Move, rename, or renumber within the system
    Mv {
        source: String,
        destination: Option<String>,
        /// Archive to xx.99 (ID) or x0.99 (category)
        #[arg(short = 'a', long)]
        archive: bool,
        /// Show what would happen without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Restore an archived ID or category
    Restore {
        target: String,
        /// If the original number is taken, restore to the next available
        #[arg(long)]
        renumber: bool,
        /// Show what would happen without doing it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Check the filing system for consistency issues
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show where attention is needed most
    Triage {
        /// Number of results per section
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,
        /// Show all, not just the top N
        #[arg(long)]
        all: bool,
    },
    /// Output the full index as JSON (for agent consumption)
    Json,
    /// Regenerate the 00.00 master index from the filesystem
    GenerateIndex,
    /// Manage policy documents
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Show the active write scope
    Scope,
}

#[derive(Subcommand)]
pub enum NewCommands {
    /// Create a new ID in a category
    Id {
        category: u8,
        name: String,
        /// Explicit sequence number (default: next available)
        #[arg(long)]
        at: Option<u8>,
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Create a new category in an area
    Category {
        /// Any number inside the target area's band
        area: u8,
        name: String,
        /// Explicit category number (default: next available)
        #[arg(long)]
        at: Option<u8>,
        /// Skip creating xx.00 and xx.01
        #[arg(long)]
        no_init: bool,
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Show policy for a path or address. Default: resolved (cascaded)
    Show {
        target: Option<String>,
        /// Show only the local document instead of the cascaded result
        #[arg(long)]
        local: bool,
    },
    /// Get a single policy value by dotted key
    Get {
        key: String,
        target: Option<String>,
    },
    /// Set a policy value in the governing meta dir's document
    Set {
        key: String,
        value: String,
        target: Option<String>,
    },
    /// Remove a policy key (the level then inherits from its parent)
    Unset {
        key: String,
        target: Option<String>,
    },
    /// Show which policy documents affect a path
    Where {
        target: Option<String>,
    },
}
