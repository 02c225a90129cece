//! CLI argument definitions using clap
//!
//! Commands:
//! - chainrestore list --config <path>
//! - chainrestore resolve --config <path> --path <p> [--at N] [--report-removals]
//! - chainrestore plan --config <path> [--at N] [--include <regex>]
//! - chainrestore restore --config <path> --target <dir> [--at N] [--include <regex>] [--overwrite]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chainrestore - restore files from a chain of full and differential backups
#[derive(Parser, Debug)]
#[command(name = "chainrestore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the archives of the chain, oldest first
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./chainrestore.json")]
        config: PathBuf,
    },

    /// Decide which archive restores one path
    Resolve {
        /// Path to configuration file
        #[arg(long, default_value = "./chainrestore.json")]
        config: PathBuf,

        /// Catalog path, relative to the backup root
        #[arg(long)]
        path: String,

        /// Resolve as of this archive number (default: latest)
        #[arg(long)]
        at: Option<u32>,

        /// Report deletions instead of treating them as not found
        #[arg(long)]
        report_removals: bool,
    },

    /// Print the restore plan for every path
    Plan {
        /// Path to configuration file
        #[arg(long, default_value = "./chainrestore.json")]
        config: PathBuf,

        /// Plan as of this archive number (default: latest)
        #[arg(long)]
        at: Option<u32>,

        /// Only paths matching this regular expression
        #[arg(long)]
        include: Option<String>,
    },

    /// Restore files into a target directory
    Restore {
        /// Path to configuration file
        #[arg(long, default_value = "./chainrestore.json")]
        config: PathBuf,

        /// Directory to restore into
        #[arg(long)]
        target: PathBuf,

        /// Restore as of this archive number (default: latest)
        #[arg(long)]
        at: Option<u32>,

        /// Only paths matching this regular expression
        #[arg(long)]
        include: Option<String>,

        /// Replace files already present in the target
        #[arg(long)]
        overwrite: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
