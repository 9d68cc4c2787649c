//! Sync and check command implementations

use colored::Colorize;

use modsync_core::{
    Classification, EntryOutcome, Plan, SkippedEntry, SyncOptions, SyncReport,
};

use super::Invocation;
use crate::cli::TargetArgs;
use crate::error::Result;

/// Run the check command
///
/// Prints each entry's status without touching the managed root.
pub fn run_check(args: &TargetArgs) -> Result<()> {
    let invocation = Invocation::resolve(args)?;
    let engine = invocation.engine()?;
    let manifest = engine.load_manifest(&invocation.manifest, invocation.policy)?;
    let plan = engine.check(&manifest)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

/// Run the sync command
///
/// Per-entry failures are printed but still count as a completed run.
pub fn run_sync(args: &TargetArgs, dry_run: bool) -> Result<()> {
    let invocation = Invocation::resolve(args)?;
    let engine = invocation.engine()?;
    let manifest = engine.load_manifest(&invocation.manifest, invocation.policy)?;

    if !args.json {
        println!(
            "{} Synchronizing {} ({} mode{})...",
            "=>".blue().bold(),
            invocation.root.as_str().cyan(),
            invocation.mode,
            if dry_run { ", dry run" } else { "" }
        );
    }

    let report = engine.sync(&manifest, SyncOptions { dry_run })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn status_label(classification: Classification) -> colored::ColoredString {
    match classification {
        Classification::Satisfied => "NOTHING TO BE DONE".green(),
        Classification::Missing => "MISSING".yellow().bold(),
        Classification::Stale => "OUT OF DATE".yellow().bold(),
        Classification::ObsoletePresent => "DEPRECATED".red().bold(),
    }
}

fn print_entry(name: &str, relative_path: &str, version: &str, classification: Classification) {
    println!();
    println!("[{}]", name.bold());
    println!("Filename: {}", relative_path);
    println!("Version: {}", version);
    println!("Status: {}", status_label(classification));
}

fn print_skipped(skipped: &[SkippedEntry]) {
    for entry in skipped {
        println!(
            "   {} entry #{}{}: skipped: {}",
            "!".yellow(),
            entry.index,
            entry
                .label
                .as_deref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default(),
            entry.reason
        );
    }
}

fn print_plan(plan: &Plan) {
    for item in &plan.items {
        print_entry(
            &item.entry.name,
            &item.entry.relative_path(),
            &item.entry.version,
            item.classification(),
        );
        if let Some(reason) = &item.inspection.read_error {
            println!("   {} cannot read current file: {}", "!".yellow(), reason);
        }
    }

    println!();
    print_skipped(&plan.skipped);
    if plan.is_noop() {
        println!("{} Up to date. No changes needed.", "OK".green().bold());
    } else {
        println!(
            "{} {} of {} entries need changes.",
            "PENDING".yellow().bold(),
            plan.pending(),
            plan.items.len()
        );
    }
}

fn print_report(report: &SyncReport) {
    for entry in &report.entries {
        print_entry(
            &entry.name,
            &entry.relative_path,
            &entry.version,
            entry.classification,
        );
        match &entry.outcome {
            EntryOutcome::Unchanged => {}
            EntryOutcome::Fetched { bytes, replaced } => {
                let verb = if *replaced { "Updated" } else { "Downloaded" };
                println!("   {} {} ({} bytes)", "+".green(), verb, bytes);
            }
            EntryOutcome::Deleted => println!("   {} Deleted", "-".red()),
            EntryOutcome::AlreadyAbsent => println!("   {} Already removed", "-".dimmed()),
            EntryOutcome::WouldFetch => println!("   {} Would download", "+".dimmed()),
            EntryOutcome::WouldDelete => println!("   {} Would delete", "-".dimmed()),
            EntryOutcome::Failed { kind, message } => {
                println!("   {} {}: {}: {}", "x".red().bold(), entry.name, kind, message);
            }
        }
    }

    println!();
    print_skipped(&report.skipped);

    let summary = report.summary();
    let line = format!(
        "{} unchanged, {} fetched, {} deleted, {} failed, {} skipped",
        summary.unchanged, summary.fetched, summary.deleted, summary.failed, summary.skipped
    );
    if report.has_failures() {
        println!("{} {}", "DONE WITH ERRORS".red().bold(), line);
    } else {
        println!("{} {}", "OK".green().bold(), line);
    }
}
