//! ReconcileEngine implementation
//!
//! The engine brings a managed root in line with a manifest: it loads the
//! manifest through a [`Transport`], builds a [`Plan`], and executes the plan
//! one entry at a time. A failing entry is recorded in the report and the run
//! moves on to the next one.

use tracing::{info, warn};

use modsync_fs::{NormalizedPath, RootLock, ensure_dir};

use crate::delete::{self, Removed};
use crate::fetch::{self, FailureKind};
use crate::manifest::ParsePolicy;
use crate::plan::{Plan, PlanItem, PlannedAction, build_plan};
use crate::report::{EntryOutcome, EntryReport, SyncReport};
use crate::transport::{DefaultTransport, Transport, TransportOptions};
use crate::{Error, Manifest, Mode, Result};

/// Options for sync operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Plan and report without touching the filesystem
    pub dry_run: bool,
}

/// Engine for reconciling a managed root against a manifest
///
/// - **check**: classify every entry and return the plan
/// - **sync**: execute the plan and report per-entry outcomes
pub struct ReconcileEngine {
    root: NormalizedPath,
    mode: Mode,
    transport: Box<dyn Transport>,
}

impl ReconcileEngine {
    /// Create an engine for `root` in `mode` using `transport` for all I/O
    /// outside the root.
    pub fn new(root: NormalizedPath, mode: Mode, transport: Box<dyn Transport>) -> Self {
        Self {
            root,
            mode,
            transport,
        }
    }

    /// Create an engine with the HTTP/file [`DefaultTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_default_transport(
        root: NormalizedPath,
        mode: Mode,
        options: &TransportOptions,
    ) -> Result<Self> {
        let transport = DefaultTransport::new(options)?;
        Ok(Self::new(root, mode, Box::new(transport)))
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fetch and parse the manifest at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestFetch`] if the document cannot be retrieved,
    /// or a parse error as described on [`Manifest::parse`].
    pub fn load_manifest(&self, location: &str, policy: ParsePolicy) -> Result<Manifest> {
        let bytes = self
            .transport
            .fetch(location)
            .map_err(|source| Error::ManifestFetch {
                location: location.to_string(),
                source,
            })?;
        let manifest = Manifest::parse(&bytes, policy)?;
        info!(
            location,
            entries = manifest.len(),
            skipped = manifest.skipped().len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Classify every entry and plan its action without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetCollision`] if two entries share a target.
    pub fn check(&self, manifest: &Manifest) -> Result<Plan> {
        build_plan(manifest, &self.root, self.mode)
    }

    /// Bring the root in line with `manifest`.
    ///
    /// Per-entry failures end up in the report; only conditions that prevent
    /// the run from starting are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created, another run holds the
    /// root lock, or two entries share a target.
    pub fn sync(&self, manifest: &Manifest, options: SyncOptions) -> Result<SyncReport> {
        if options.dry_run {
            let plan = self.check(manifest)?;
            return Ok(self.report(plan, true, |item| match item.action {
                PlannedAction::None => EntryOutcome::Unchanged,
                PlannedAction::FetchAndReplace { .. } => EntryOutcome::WouldFetch,
                PlannedAction::Delete { .. } => EntryOutcome::WouldDelete,
            }));
        }

        ensure_dir(&self.root)?;
        let _lock = RootLock::acquire(&self.root)?;

        let plan = self.check(manifest)?;
        let report = self.report(plan, false, |item| self.execute(item));

        let summary = report.summary();
        info!(
            fetched = summary.fetched,
            deleted = summary.deleted,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "Sync complete"
        );
        Ok(report)
    }

    fn execute(&self, item: &PlanItem) -> EntryOutcome {
        match &item.action {
            PlannedAction::None => EntryOutcome::Unchanged,
            PlannedAction::FetchAndReplace { entry } => {
                match fetch::apply(entry, &item.target, self.transport.as_ref()) {
                    Ok(applied) => EntryOutcome::Fetched {
                        bytes: applied.bytes,
                        replaced: applied.replaced,
                    },
                    Err(e) => {
                        warn!(entry = %entry.name, error = %e, "Fetch failed");
                        EntryOutcome::Failed {
                            kind: e.kind(),
                            message: e.to_string(),
                        }
                    }
                }
            }
            PlannedAction::Delete { path } => match delete::remove(path) {
                Ok(Removed::Deleted) => EntryOutcome::Deleted,
                Ok(Removed::AlreadyAbsent) => EntryOutcome::AlreadyAbsent,
                Err(e) => {
                    warn!(entry = %item.entry.name, error = %e, "Delete failed");
                    EntryOutcome::Failed {
                        kind: FailureKind::Deletion,
                        message: e.to_string(),
                    }
                }
            },
        }
    }

    fn report(
        &self,
        plan: Plan,
        dry_run: bool,
        mut outcome: impl FnMut(&PlanItem) -> EntryOutcome,
    ) -> SyncReport {
        let entries = plan
            .items
            .iter()
            .map(|item| EntryReport {
                name: item.entry.name.clone(),
                version: item.entry.version.clone(),
                relative_path: item.entry.relative_path(),
                target: item.target.clone(),
                classification: item.classification(),
                outcome: outcome(item),
            })
            .collect();

        SyncReport {
            mode: self.mode,
            dry_run,
            entries,
            skipped: plan.skipped,
        }
    }
}

impl std::fmt::Debug for ReconcileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("root", &self.root)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
