//! Advisory lock on a managed root

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;
use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Name of the lock file created inside the managed root.
pub const LOCK_FILE_NAME: &str = ".modsync.lock";

/// Exclusive advisory lock held for the duration of a run.
///
/// Two runs against the same root would race on the same target and staging
/// paths; the second one fails to acquire the lock instead. The lock is
/// released when the value is dropped. The lock file itself is left in place.
#[derive(Debug)]
pub struct RootLock {
    file: File,
    path: NormalizedPath,
}

impl RootLock {
    /// Try to take the lock on `root` without blocking.
    ///
    /// The root directory must exist.
    pub fn acquire(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(LOCK_FILE_NAME);
        let native = path.to_native();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|e| Error::io(&native, e))?;

        file.try_lock_exclusive()
            .map_err(|e| lock_error(root, &native, e))?;

        debug!(path = %path, "Acquired root lock");
        Ok(Self { file, path })
    }

    /// Location of the lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

/// Only contention means another run holds the root.
fn lock_error(root: &NormalizedPath, lock_path: &Path, e: io::Error) -> Error {
    let contended = e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error();
    if contended {
        Error::LockFailed {
            path: root.to_native(),
        }
    } else {
        Error::io(lock_path, e)
    }
}

impl Drop for RootLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
