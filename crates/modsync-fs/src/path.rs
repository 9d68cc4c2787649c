//! Normalized path handling and managed-root confinement

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Separators are unified, repeated slashes and `.` components are dropped,
/// so two spellings of the same location compare equal. This is what target
/// path collision detection relies on. Conversion to a platform-native
/// `PathBuf` happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self {
            inner: normalize(&raw),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// An empty segment (or `.`) yields the same path.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self {
            inner: normalize(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

fn normalize(raw: &str) -> String {
    let prefix = if raw.starts_with("//") {
        "//"
    } else if raw.starts_with('/') {
        "/"
    } else {
        ""
    };

    let body = raw
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/");

    if body.is_empty() && prefix.is_empty() && raw.starts_with('.') {
        return ".".to_string();
    }
    format!("{}{}", prefix, body)
}

/// Validate a manifest destination subpath.
///
/// The subpath must stay inside the managed root once joined: it may not be
/// absolute, carry a drive prefix, or contain a `..` component. An empty
/// subpath means the managed root itself.
pub fn validate_subpath(subpath: &str) -> Result<()> {
    let unified = subpath.replace('\\', "/");

    if unified.starts_with('/') {
        return Err(Error::PathEscapesRoot {
            path: subpath.to_string(),
            reason: "absolute paths are not allowed".to_string(),
        });
    }

    let bytes = unified.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(Error::PathEscapesRoot {
            path: subpath.to_string(),
            reason: "drive prefixes are not allowed".to_string(),
        });
    }

    if unified.split('/').any(|part| part == "..") {
        return Err(Error::PathEscapesRoot {
            path: subpath.to_string(),
            reason: "parent directory components are not allowed".to_string(),
        });
    }

    Ok(())
}

/// Validate a manifest file name: exactly one non-special path component.
pub fn validate_file_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("file name is empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("file name contains a path separator")
    } else if name == "." || name == ".." {
        Some("file name is a special directory entry")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidFileName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
