//! State classification of one entry against the filesystem

use serde::Serialize;
use tracing::{debug, warn};

use modsync_fs::{NormalizedPath, compute_file_digest};

use crate::applicability::{self, Applicability};
use crate::{ManifestEntry, Mode};

/// Where an entry stands relative to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Nothing to do: present and correct, or absent and not wanted
    Satisfied,
    /// Wanted but absent
    Missing,
    /// Wanted and present, but content differs from the manifest
    Stale,
    /// Present but no longer wanted in this mode
    ObsoletePresent,
}

/// Classify an entry from already-observed facts.
///
/// `hash_matches` is only consulted when the entry is applicable and the
/// target exists.
pub fn classify(
    entry: &ManifestEntry,
    mode: Mode,
    target_exists: bool,
    hash_matches: bool,
) -> Classification {
    decide(
        applicability::resolve(entry, mode).is_required(),
        target_exists,
        || hash_matches,
    )
}

/// The decision table, first match wins.
fn decide(
    applicable: bool,
    exists: bool,
    hash_matches: impl FnOnce() -> bool,
) -> Classification {
    match (applicable, exists) {
        (false, true) => Classification::ObsoletePresent,
        (false, false) => Classification::Satisfied,
        (true, false) => Classification::Missing,
        (true, true) if hash_matches() => Classification::Satisfied,
        (true, true) => Classification::Stale,
    }
}

/// Everything learned about one entry while classifying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub applicability: Applicability,
    pub classification: Classification,
    pub exists: bool,
    /// Digest of the current target, when it was computed
    pub actual_hash: Option<String>,
    /// Why the existing target could not be read, if it could not
    pub read_error: Option<String>,
}

/// Observe `target` on disk and classify `entry`.
///
/// The target is hashed only when the entry is applicable and the target
/// exists. A target that exists but cannot be read is classified as stale so
/// the fetch replaces it; the read error is kept on the inspection.
pub fn inspect(entry: &ManifestEntry, mode: Mode, target: &NormalizedPath) -> Inspection {
    let applicability = applicability::resolve(entry, mode);
    let exists = target.exists();
    let mut actual_hash = None;
    let mut read_error = None;

    let classification = decide(applicability.is_required(), exists, || {
        match compute_file_digest(target.as_ref()) {
            Ok(digest) => {
                let matches = digest == entry.content_hash;
                actual_hash = Some(digest);
                matches
            }
            Err(e) => {
                warn!(entry = %entry.name, path = %target, error = %e, "Cannot read existing target");
                read_error = Some(e.to_string());
                false
            }
        }
    });

    debug!(
        entry = %entry.name,
        path = %target,
        ?applicability,
        exists,
        ?classification,
        "Classified entry"
    );

    Inspection {
        applicability,
        classification,
        exists,
        actual_hash,
        read_error,
    }
}
