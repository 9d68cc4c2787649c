//! A single manifest entry and its wire representation

use modsync_fs::{NormalizedPath, staging_path, validate_file_name, validate_subpath};
use serde::{Deserialize, Serialize};

/// One file the manifest manages.
///
/// Immutable once parsed. `filename` and `destination_subpath` have been
/// checked to stay inside the managed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Source location of the file content
    pub url: String,
    /// Human-readable label
    pub name: String,
    /// Display only; never compared
    pub version: String,
    /// Base name of the file on disk
    pub filename: String,
    /// Expected MD5 digest, hex
    pub content_hash: String,
    /// Directory under the managed root; empty means the root itself
    pub destination_subpath: String,
    pub applies_to_server: bool,
    pub applies_to_client: bool,
    /// Deprecated entries are never applicable
    pub deprecated: bool,
}

impl ManifestEntry {
    /// The on-disk location this entry occupies under `root`.
    pub fn target_path(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.destination_subpath).join(&self.filename)
    }

    /// The temporary location used while this entry is downloaded.
    pub fn staging_path(&self, root: &NormalizedPath) -> NormalizedPath {
        staging_path(&self.target_path(root))
    }

    /// `destination/filename`, relative to the managed root.
    pub fn relative_path(&self) -> String {
        NormalizedPath::new(".")
            .join(&self.destination_subpath)
            .join(&self.filename)
            .to_string()
    }
}

/// Manifest entry as it appears on the wire.
///
/// Every field is optional here so a missing one can be reported by name
/// instead of failing the whole document. Both the current field names and
/// the legacy short names are accepted.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEntry {
    url: Option<String>,
    name: Option<String>,
    version: Option<String>,
    filename: Option<String>,
    #[serde(rename = "contentHash", alias = "md5", alias = "content_hash")]
    content_hash: Option<String>,
    #[serde(
        rename = "destinationSubpath",
        alias = "destination",
        alias = "destination_subpath"
    )]
    destination_subpath: Option<String>,
    #[serde(rename = "appliesToServer", alias = "server", alias = "applies_to_server")]
    applies_to_server: Option<bool>,
    #[serde(rename = "appliesToClient", alias = "client", alias = "applies_to_client")]
    applies_to_client: Option<bool>,
    deprecated: Option<bool>,
}

impl RawEntry {
    /// Best available label for error messages.
    pub(crate) fn label(&self) -> Option<String> {
        self.name.clone().or_else(|| self.filename.clone())
    }

    /// Check required fields and path confinement.
    pub(crate) fn validate(self) -> std::result::Result<ManifestEntry, String> {
        let mut absent = Vec::new();
        let url = required(self.url, "url", &mut absent);
        let filename = required(self.filename, "filename", &mut absent);
        let content_hash = required(self.content_hash, "contentHash", &mut absent);
        if self.destination_subpath.is_none() {
            absent.push("destinationSubpath");
        }
        if !absent.is_empty() {
            return Err(format!("missing required field(s): {}", absent.join(", ")));
        }

        let filename = filename.unwrap_or_default();
        let destination_subpath = self.destination_subpath.unwrap_or_default();
        validate_file_name(&filename).map_err(|e| e.to_string())?;
        validate_subpath(&destination_subpath).map_err(|e| e.to_string())?;

        Ok(ManifestEntry {
            url: url.unwrap_or_default(),
            name: self.name.unwrap_or_else(|| filename.clone()),
            version: self.version.unwrap_or_default(),
            filename,
            content_hash: content_hash.unwrap_or_default(),
            destination_subpath,
            applies_to_server: self.applies_to_server.unwrap_or(false),
            applies_to_client: self.applies_to_client.unwrap_or(false),
            deprecated: self.deprecated.unwrap_or(false),
        })
    }
}

/// Present and non-blank, or recorded as absent.
fn required(
    value: Option<String>,
    field: &'static str,
    absent: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            absent.push(field);
            None
        }
    }
}
