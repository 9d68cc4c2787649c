//! Error types for modsync-core

use std::path::PathBuf;

use modsync_fs::NormalizedPath;

use crate::transport::TransportError;

/// Result type for modsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole run
///
/// Failures confined to a single entry are not represented here; they are
/// recorded as [`crate::FetchFailed`] or [`crate::DeleteFailed`] in the run
/// report and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mode string is neither `server` nor `client`
    #[error("Invalid mode: {mode} (expected \"server\" or \"client\")")]
    InvalidMode { mode: String },

    /// The manifest could not be retrieved
    #[error("Failed to fetch manifest from {location}: {source}")]
    ManifestFetch {
        location: String,
        #[source]
        source: TransportError,
    },

    /// The manifest document is not a JSON array of entries
    #[error("Failed to parse manifest: {message}")]
    ManifestParse { message: String },

    /// A manifest entry is missing required fields or names an unsafe path
    #[error("Invalid manifest entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// Two entries resolve to the same location on disk
    #[error("Target path collision at {path}: {first} and {second}")]
    TargetCollision {
        path: NormalizedPath,
        first: String,
        second: String,
    },

    /// An entry would overwrite or delete the run's own lock file
    #[error("Entry {entry} targets the run lock at {path}")]
    ReservedTarget { path: NormalizedPath, entry: String },

    /// Settings file could not be parsed
    #[error("Failed to parse {format} settings at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Settings file has an extension we do not read
    #[error("Unsupported settings format: {extension:?} (expected .toml or .json)")]
    UnsupportedConfigFormat { extension: String },

    /// Transport could not be constructed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Filesystem error from modsync-fs
    #[error(transparent)]
    Fs(#[from] modsync_fs::Error),
}
