//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::ExportFormat;

/// Turn a hierarchical knowledge base into navigable, cross-linked HTML pages
#[derive(Parser, Debug)]
#[command(name = "kbgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding `.kbgraph.toml` (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the hierarchy and write one HTML page per node
    Generate {
        /// Markdown directory or YAML structure file
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
        /// Regenerate only the page of this node id
        #[arg(long, value_name = "ID")]
        item: Option<String>,
    },

    /// Find nodes by id, title or context
    Search {
        /// Case-insensitive search text
        query: String,
        /// Markdown directory or YAML structure file
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
    },

    /// Show hierarchy as tree
    Tree {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
    },

    /// Show node counts per level
    Summary {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
    },

    /// Report placeholders and nodes without context
    Validate {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
    },

    /// Write the hierarchy as JSON or YAML
    Export {
        #[arg(value_hint = ValueHint::AnyPath)]
        source: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Document format (default: from the output extension, else json)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Add a generation timestamp to the metadata
        #[arg(long)]
        timestamp: bool,
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

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective merged settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
