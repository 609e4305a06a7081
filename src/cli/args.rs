//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Popup store catalog: manage the category tree
#[derive(Parser, Debug)]
#[command(name = "popcat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Catalog file (overrides config and POPCAT_CATALOG_FILE)
    #[arg(short = 'f', long = "file", global = true, value_hint = ValueHint::FilePath)]
    pub catalog_file: Option<PathBuf>,

    /// Config file (default: ~/.config/popcat/popcat.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a category
    Add {
        /// Unique category name
        name: String,
        /// Parent category name (omit for a root)
        #[arg(short, long)]
        parent: Option<String>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Position among siblings (default: 0)
        #[arg(short, long, allow_negative_numbers = true)]
        sort: Option<f64>,
    },

    /// Rename or re-describe a category
    Edit {
        /// Current category name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
        /// New position among siblings
        #[arg(short, long, allow_negative_numbers = true)]
        sort: Option<f64>,
    },

    /// Move a category under another parent
    Mv {
        /// Category to move
        name: String,
        /// New parent name
        #[arg(required_unless_present = "root", conflicts_with = "root")]
        parent: Option<String>,
        /// Make it a root category
        #[arg(long)]
        root: bool,
    },

    /// Set the sort order of a category
    Reorder {
        name: String,
        #[arg(allow_negative_numbers = true)]
        sort_order: f64,
    },

    /// Place a category after all siblings or between two of them
    Place {
        name: String,
        /// Sibling that should come before
        #[arg(long, requires = "before")]
        after: Option<String>,
        /// Sibling that should come after
        #[arg(long, requires = "after")]
        before: Option<String>,
    },

    /// Renumber children to 0, 1, 2, ... keeping their order
    Renumber {
        /// Parent name (omit for the roots)
        parent: Option<String>,
    },

    /// Mark categories active
    Activate {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Mark categories inactive
    Deactivate {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Delete a leaf category
    Rm { name: String },

    /// Show a category with its tree position
    Show { name: String },

    /// List the ancestor chain, parent first
    Ancestors { name: String },

    /// List all descendants, breadth first
    Descendants { name: String },

    /// List categories
    List {
        /// Only root categories; with --active, only active roots
        #[arg(long, conflicts_with = "children_of")]
        roots: bool,
        /// Only active categories
        #[arg(long)]
        active: bool,
        /// Only direct children of this category
        #[arg(long, value_name = "PARENT")]
        children_of: Option<String>,
    },

    /// Show the category tree
    Tree {
        /// Hide inactive categories and their subtrees
        #[arg(long)]
        active: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
