//! Per-entry outcomes of a sync run

use serde::Serialize;

use modsync_fs::NormalizedPath;

use crate::Mode;
use crate::classify::Classification;
use crate::fetch::FailureKind;
use crate::manifest::SkippedEntry;

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum EntryOutcome {
    /// Already satisfied
    Unchanged,
    Fetched { bytes: u64, replaced: bool },
    Deleted,
    /// Scheduled for deletion but already gone
    AlreadyAbsent,
    Failed { kind: FailureKind, message: String },
    WouldFetch,
    WouldDelete,
}

impl EntryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, EntryOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub version: String,
    /// `destination/filename` relative to the root
    pub relative_path: String,
    pub target: NormalizedPath,
    pub classification: Classification,
    pub outcome: EntryOutcome,
}

/// Tallies over a [`SyncReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub unchanged: usize,
    pub fetched: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Result of a sync run, in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub entries: Vec<EntryReport>,
    pub skipped: Vec<SkippedEntry>,
}

impl SyncReport {
    /// Count outcomes. Dry-run outcomes count as the action they stand for.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            skipped: self.skipped.len(),
            ..Summary::default()
        };
        for entry in &self.entries {
            match entry.outcome {
                EntryOutcome::Unchanged => summary.unchanged += 1,
                EntryOutcome::Fetched { .. } | EntryOutcome::WouldFetch => summary.fetched += 1,
                EntryOutcome::Deleted
                | EntryOutcome::AlreadyAbsent
                | EntryOutcome::WouldDelete => summary.deleted += 1,
                EntryOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}
