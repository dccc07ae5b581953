//! Command-line surface and subcommand implementations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod import;

/// Import another repository's history into a subdirectory of this one.
#[derive(Debug, Parser)]
#[command(name = "graft", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log git invocations and session steps to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "project", global = true, value_name = "PATH")]
    pub project: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a repository's commit history into a package directory
    Import(ImportArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to the external repository
    pub dir: PathBuf,

    /// Package directory to import into (default: the first configured one)
    #[arg(long, value_name = "BASE")]
    pub dest: Option<String>,

    /// Import each first-parent commit as a single flattened diff
    #[arg(long)]
    pub flatten: bool,

    /// Record each commit with its original author as committer
    #[arg(long)]
    pub preserve_commit: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}
