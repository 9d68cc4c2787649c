//! Error types for modsync-fs

use std::path::PathBuf;

/// Result type for modsync-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in modsync-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {path:?} escapes the managed root: {reason}")]
    PathEscapesRoot { path: String, reason: String },

    #[error("Invalid file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("Managed root {path} is locked by another run")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
