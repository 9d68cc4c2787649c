//! modsync CLI
//!
//! Reconciles a managed directory of mods, shader packs and resource packs
//! against a remote manifest.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Sync { target, dry_run } => commands::run_sync(&target, dry_run),
        Commands::Check { target } => commands::run_check(&target),
    }
}
