//! Deletion of targets that are no longer applicable

use serde::Serialize;
use tracing::info;

use modsync_fs::{NormalizedPath, remove_if_exists};

/// Result of a successful removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Removed {
    Deleted,
    /// Already gone when we got to it
    AlreadyAbsent,
}

/// The target exists but could not be removed.
#[derive(Debug, thiserror::Error)]
#[error("could not delete {path}: {source}")]
pub struct DeleteFailed {
    pub path: NormalizedPath,
    #[source]
    pub source: modsync_fs::Error,
}

/// Remove `path`. A path that is already absent counts as success.
pub fn remove(path: &NormalizedPath) -> Result<Removed, DeleteFailed> {
    match remove_if_exists(path) {
        Ok(true) => {
            info!(path = %path, "Deleted");
            Ok(Removed::Deleted)
        }
        Ok(false) => Ok(Removed::AlreadyAbsent),
        Err(source) => Err(DeleteFailed {
            path: path.clone(),
            source,
        }),
    }
}
