//! Filesystem layer for modsync
//!
//! Provides the primitives the reconciliation engine builds on:
//!
//! - [`NormalizedPath`] and managed-root confinement of manifest paths
//! - [`checksum`]: streaming MD5 content digests and verification
//! - [`io`]: staged (temp-then-rename) writes, idempotent removal, directory creation
//! - [`lock`]: advisory lock on a managed root for the duration of a run

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use checksum::{compute_content_digest, compute_file_digest, verify_file};
pub use error::{Error, Result};
pub use io::{SealedFile, StagedFile, ensure_dir, remove_if_exists, staging_path};
pub use lock::{LOCK_FILE_NAME, RootLock};
pub use path::{NormalizedPath, validate_file_name, validate_subpath};
