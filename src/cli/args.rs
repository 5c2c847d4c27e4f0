//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Drive a tree selector from the command line: decode a value against a forest, apply a gesture, show the result
#[derive(Parser, Debug)]
#[command(name = "treeselect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (layered over the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Forest, value and mode switches shared by all tree commands.
///
/// Mode switches only turn options on; everything else comes from config.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// JSON file with the forest (array of node objects)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub forest: PathBuf,

    /// Current value: JSON, or a plain delimited string
    #[arg(short = 'v', long)]
    pub value: Option<String>,

    /// Multiple choice
    #[arg(short, long)]
    pub multiple: bool,

    /// Independent parent/child selection
    #[arg(long)]
    pub cascade: bool,

    /// Keep descendants selected together with a checked parent
    #[arg(long, conflicts_with = "only_children")]
    pub with_children: bool,

    /// Select the leaves of a checked parent instead of the parent
    #[arg(long)]
    pub only_children: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the forest with the decoded selection
    Show {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Check (or uncheck) a node in multiple mode
    Check {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the node
        node: String,
        /// Uncheck instead of check
        #[arg(short, long)]
        uncheck: bool,
    },

    /// Select a single node
    Select {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the node
        node: String,
    },

    /// Click a node: toggles in multiple mode, selects otherwise
    Activate {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the node
        node: String,
    },

    /// Toggle a branch open or closed
    Fold {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the branch node
        node: String,
    },

    /// Drop the whole selection
    Clear {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Add a node inline and print the add request
    Add {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the parent node (root level when omitted)
        #[arg(short, long)]
        parent: Option<String>,
        /// Label of the new node
        #[arg(short, long)]
        label: String,
    },

    /// Rename a node inline and print the edit request
    Edit {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the node
        node: String,
        /// New label
        #[arg(short, long)]
        label: String,
    },

    /// Print the delete request for a node
    Remove {
        #[command(flatten)]
        tree: TreeArgs,
        /// Value of the node
        node: String,
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
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
