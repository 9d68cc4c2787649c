//! Reconciliation engine for modsync
//!
//! Given a manifest of files (mods, shader packs, resource packs) and a
//! managed root, modsync works out which files must be downloaded, replaced
//! or removed for the active [`Mode`], and applies those changes so that a
//! file on disk is only ever replaced by a fully downloaded, verified copy.
//!
//! The pipeline, per entry:
//!
//! 1. [`applicability`]: should the entry exist in this mode?
//! 2. [`classify`]: compare that against the target on disk
//! 3. [`plan`]: turn the classification into an action
//! 4. [`fetch`] or [`delete`]: execute it
//!
//! [`ReconcileEngine`] drives the pipeline over a whole [`Manifest`].

pub mod applicability;
pub mod classify;
pub mod config;
pub mod delete;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod mode;
pub mod plan;
pub mod report;
pub mod transport;

pub use applicability::{Applicability, Exclusion, is_applicable};
pub use classify::{Classification, Inspection};
pub use config::Settings;
pub use delete::{DeleteFailed, Removed};
pub use engine::{ReconcileEngine, SyncOptions};
pub use error::{Error, Result};
pub use fetch::{Applied, FailureKind, FetchFailed};
pub use manifest::{Manifest, ManifestEntry, ParsePolicy, SkippedEntry};
pub use mode::Mode;
pub use plan::{Plan, PlanItem, PlannedAction};
pub use report::{EntryOutcome, EntryReport, Summary, SyncReport};
pub use transport::{
    DefaultTransport, FileTransport, HttpTransport, Transport, TransportError, TransportOptions,
};
