//! Transactional fetch-and-replace
//!
//! The target only ever changes through a rename of a fully downloaded,
//! verified staging file. Every failure before that point removes the staging
//! file and leaves the target exactly as it was.

use serde::Serialize;
use tracing::{info, warn};

use modsync_fs::{NormalizedPath, StagedFile, ensure_dir};

use crate::ManifestEntry;
use crate::transport::{Transport, TransportError};

/// A successful fetch-and-replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Applied {
    /// Bytes written to the target
    pub bytes: u64,
    /// Whether an existing file was replaced
    pub replaced: bool,
}

/// Category of a per-entry failure, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Directory,
    Staging,
    Download,
    Verification,
    Promotion,
    Deletion,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Directory => "directory creation failed",
            FailureKind::Staging => "staging failed",
            FailureKind::Download => "download failed",
            FailureKind::Verification => "verification failed",
            FailureKind::Promotion => "replace failed",
            FailureKind::Deletion => "delete failed",
        };
        f.write_str(label)
    }
}

/// Why a fetch-and-replace did not complete. The target is untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailed {
    #[error("could not create {path}: {source}")]
    CreateDir {
        path: NormalizedPath,
        #[source]
        source: modsync_fs::Error,
    },

    #[error("could not stage download: {0}")]
    Stage(#[source] modsync_fs::Error),

    #[error(transparent)]
    Download(TransportError),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    Verification { expected: String, actual: String },

    #[error("could not move download into place: {0}")]
    Promote(#[source] modsync_fs::Error),
}

impl FetchFailed {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchFailed::CreateDir { .. } => FailureKind::Directory,
            FetchFailed::Stage(_) => FailureKind::Staging,
            FetchFailed::Download(_) => FailureKind::Download,
            FetchFailed::Verification { .. } => FailureKind::Verification,
            FetchFailed::Promote(_) => FailureKind::Promotion,
        }
    }
}

/// Download `entry` into a staging file beside `target`, verify it, and
/// rename it over `target`.
pub fn apply(
    entry: &ManifestEntry,
    target: &NormalizedPath,
    transport: &dyn Transport,
) -> Result<Applied, FetchFailed> {
    if let Some(parent) = target.parent() {
        ensure_dir(&parent).map_err(|source| FetchFailed::CreateDir {
            path: parent.clone(),
            source,
        })?;
    }

    let mut staged = StagedFile::create(target).map_err(FetchFailed::Stage)?;
    let bytes = transport
        .download(&entry.url, &mut staged)
        .map_err(FetchFailed::Download)?;
    let sealed = staged.seal().map_err(FetchFailed::Stage)?;

    let actual = sealed.digest().map_err(FetchFailed::Stage)?;
    if actual != entry.content_hash {
        if let Err(e) = sealed.discard() {
            warn!(entry = %entry.name, error = %e, "Failed to discard rejected download");
        }
        return Err(FetchFailed::Verification {
            expected: entry.content_hash.clone(),
            actual,
        });
    }

    let replaced = target.exists();
    sealed.promote().map_err(FetchFailed::Promote)?;
    info!(entry = %entry.name, path = %target, bytes, replaced, "Installed");

    Ok(Applied { bytes, replaced })
}
