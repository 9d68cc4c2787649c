//! Staged writes, idempotent removal and directory creation
//!
//! A [`StagedFile`] is the scoped form of the temp-then-rename pattern: bytes
//! are written to `<filename>.tmp` next to the target, the handle is sealed,
//! and the sealed file is either promoted onto the target with a single rename
//! or discarded. Dropping either handle at any point before promotion removes
//! the temporary file, so no exit path leaves one behind and none touches the
//! target.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::{Error, NormalizedPath, Result, checksum};

/// Suffix appended to a target's file name to form its staging path.
pub const STAGING_SUFFIX: &str = ".tmp";

/// Path of the temporary file used while staging `target`.
///
/// Always in the same directory as the target so the final rename stays on
/// one volume.
pub fn staging_path(target: &NormalizedPath) -> NormalizedPath {
    let name = format!("{}{}", target.file_name().unwrap_or_default(), STAGING_SUFFIX);
    match target.parent() {
        Some(parent) => parent.join(&name),
        None => NormalizedPath::new(name),
    }
}

/// Create `path` and any missing ancestors.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    if native.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(&native).map_err(|e| Error::io(&native, e))
}

/// Remove the file at `path` if it exists.
///
/// Returns `true` when a file was removed and `false` when there was nothing
/// to remove, so calling it twice in a row succeeds both times.
pub fn remove_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    match fs::remove_file(&native) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native, e)),
    }
}

/// Removes the temporary file on drop unless disarmed.
#[derive(Debug)]
struct TempGuard {
    path: PathBuf,
    armed: bool,
}

impl TempGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staging file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staging file"),
        }
    }
}

/// A temporary file being written on behalf of a target path.
#[derive(Debug)]
pub struct StagedFile {
    target: NormalizedPath,
    file: File,
    guard: TempGuard,
}

impl StagedFile {
    /// Open the staging file for `target`, truncating any leftover from an
    /// interrupted earlier run.
    ///
    /// The target's parent directory must already exist.
    pub fn create(target: &NormalizedPath) -> Result<Self> {
        let temp = staging_path(target).to_native();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp)
            .map_err(|e| Error::io(&temp, e))?;

        Ok(Self {
            target: target.clone(),
            file,
            guard: TempGuard {
                path: temp,
                armed: true,
            },
        })
    }

    /// The final location this file will be promoted to.
    pub fn target(&self) -> &NormalizedPath {
        &self.target
    }

    /// The temporary location being written.
    pub fn temp_path(&self) -> &std::path::Path {
        &self.guard.path
    }

    /// Flush and fsync the written bytes and close the write handle.
    pub fn seal(mut self) -> Result<SealedFile> {
        self.file
            .flush()
            .map_err(|e| Error::io(&self.guard.path, e))?;
        self.file
            .sync_all()
            .map_err(|e| Error::io(&self.guard.path, e))?;
        drop(self.file);

        Ok(SealedFile {
            target: self.target,
            guard: self.guard,
        })
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// A fully written, closed staging file awaiting verification.
#[derive(Debug)]
pub struct SealedFile {
    target: NormalizedPath,
    guard: TempGuard,
}

impl SealedFile {
    /// The final location this file will be promoted to.
    pub fn target(&self) -> &NormalizedPath {
        &self.target
    }

    /// The temporary location holding the staged bytes.
    pub fn temp_path(&self) -> &std::path::Path {
        &self.guard.path
    }

    /// Digest of the staged bytes as lowercase hex.
    pub fn digest(&self) -> Result<String> {
        checksum::compute_file_digest(&self.guard.path)
    }

    /// Rename the staged file onto the target, replacing any existing file.
    ///
    /// This is the only step that modifies the target. On failure the staged
    /// file is removed and the target is left as it was.
    pub fn promote(mut self) -> Result<()> {
        let target = self.target.to_native();
        fs::rename(&self.guard.path, &target).map_err(|e| Error::io(&target, e))?;
        self.guard.disarm();
        Ok(())
    }

    /// Remove the staged file without touching the target.
    pub fn discard(mut self) -> Result<()> {
        let result = match fs::remove_file(&self.guard.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.guard.path, e)),
        };
        self.guard.disarm();
        result
    }
}
