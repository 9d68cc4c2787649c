//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// modsync - keep a mod, shader and resource pack folder in line with a manifest
#[derive(Parser, Debug)]
#[command(name = "modsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download, replace and delete files until the root matches the manifest
    ///
    /// Examples:
    ///   modsync sync https://example.com/pack.json ~/.minecraft
    ///   modsync sync pack.json /srv/mc --server
    ///   modsync sync --config modsync.toml --dry-run
    Sync {
        #[command(flatten)]
        target: TargetArgs,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show what each manifest entry needs without changing anything
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Arguments shared by `sync` and `check`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Manifest URL or path
    pub manifest: Option<String>,

    /// Managed root directory
    pub root: Option<PathBuf>,

    /// Shorthand for `--mode server`
    #[arg(long, conflicts_with = "mode")]
    pub server: bool,

    /// Which side to reconcile: server or client [default: client]
    #[arg(long)]
    pub mode: Option<String>,

    /// Skip malformed manifest entries instead of failing the run
    #[arg(long)]
    pub skip_invalid: bool,

    /// Limit in seconds on each whole request, body transfer included; 0 disables it [default: 60]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Settings file (.toml or .json)
    #[arg(long, env = "MODSYNC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}
