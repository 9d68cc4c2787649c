//! Applicability: whether an entry should exist on disk in a given mode

use serde::Serialize;

use crate::{ManifestEntry, Mode};

/// Why an entry is not expected on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Exclusion {
    /// Marked deprecated; excluded in every mode.
    Deprecated,
    /// Not flagged for the active mode.
    NotForMode(Mode),
}

/// Outcome of resolving an entry's flags against the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Applicability {
    Required,
    Excluded(Exclusion),
}

impl Applicability {
    pub fn is_required(&self) -> bool {
        matches!(self, Applicability::Required)
    }
}

/// Resolve the entry's flags for `mode`.
///
/// `deprecated` overrides both mode flags.
pub fn resolve(entry: &ManifestEntry, mode: Mode) -> Applicability {
    if entry.deprecated {
        return Applicability::Excluded(Exclusion::Deprecated);
    }

    let flagged = match mode {
        Mode::Server => entry.applies_to_server,
        Mode::Client => entry.applies_to_client,
    };

    if flagged {
        Applicability::Required
    } else {
        Applicability::Excluded(Exclusion::NotForMode(mode))
    }
}

/// Whether `entry` should currently exist on disk.
pub fn is_applicable(entry: &ManifestEntry, mode: Mode) -> bool {
    resolve(entry, mode).is_required()
}
