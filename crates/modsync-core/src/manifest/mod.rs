//! Manifest parsing
//!
//! The manifest is a JSON array of entry objects. A document that is not an
//! array is always fatal. What happens to an individual malformed entry is
//! decided by [`ParsePolicy`].

mod entry;

pub use entry::ManifestEntry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{Error, Result};
use entry::RawEntry;

/// How to treat a manifest entry that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Any invalid entry fails the whole manifest.
    #[default]
    Strict,
    /// Invalid entries are skipped and reported; the rest proceed.
    SkipInvalid,
}

/// An entry dropped under [`ParsePolicy::SkipInvalid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Zero-based position in the manifest array
    pub index: usize,
    /// Name or filename, when the entry carried one
    pub label: Option<String>,
    pub reason: String,
}

/// Parsed manifest: the entries to reconcile, in document order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    skipped: Vec<SkippedEntry>,
}

impl Manifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestParse`] if the bytes are not a JSON array, and
    /// [`Error::InvalidEntry`] for the first invalid entry under
    /// [`ParsePolicy::Strict`].
    pub fn parse(bytes: &[u8], policy: ParsePolicy) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_slice(bytes).map_err(|e| Error::ManifestParse {
            message: e.to_string(),
        })?;

        let mut manifest = Manifest::default();
        for (index, value) in values.into_iter().enumerate() {
            let (label, outcome) = match serde_json::from_value::<RawEntry>(value) {
                Ok(raw) => (raw.label(), raw.validate()),
                Err(e) => (None, Err(e.to_string())),
            };

            match (outcome, policy) {
                (Ok(entry), _) => manifest.entries.push(entry),
                (Err(reason), ParsePolicy::Strict) => {
                    return Err(Error::InvalidEntry { index, reason });
                }
                (Err(reason), ParsePolicy::SkipInvalid) => {
                    warn!(index, label = ?label, %reason, "Skipping invalid manifest entry");
                    manifest.skipped.push(SkippedEntry {
                        index,
                        label,
                        reason,
                    });
                }
            }
        }

        Ok(manifest)
    }

    /// Build a manifest from already-validated entries.
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self {
            entries,
            skipped: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
