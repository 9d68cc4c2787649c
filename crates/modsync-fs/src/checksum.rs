//! MD5 content digests
//!
//! Manifests identify file content by a lowercase hex MD5 digest, so that is
//! the one digest this module produces. MD5 is collision-prone: it detects
//! staleness and accidental corruption, but it is not a defence against a
//! deliberately crafted payload.

use std::fs::File;
use std::io;
use std::path::Path;

use md5::{Digest, Md5};

use crate::{Error, Result};

/// Compute the MD5 digest of in-memory content as lowercase hex.
pub fn compute_content_digest(content: &[u8]) -> String {
    format!("{:x}", Md5::digest(content))
}

/// Compute the MD5 digest of a file's contents as lowercase hex.
///
/// The file is streamed through the hasher rather than read into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check whether the file at `path` hashes to `expected`.
///
/// Comparison is exact and case-sensitive against the lowercase rendering.
///
/// # Errors
///
/// Read failures are propagated; they never count as a mismatch here.
pub fn verify_file(path: &Path, expected: &str) -> Result<bool> {
    Ok(compute_file_digest(path)? == expected)
}
