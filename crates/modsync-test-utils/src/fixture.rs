//! [`TestRoot`]: a managed root and a local mirror in one temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::manifest::ManifestBuilder;

/// Temporary layout used by engine, CLI and scenario tests:
///
/// ```text
/// <tmp>/game/     managed root
/// <tmp>/mirror/   file content and manifest served by FileTransport
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use modsync_test_utils::{EntrySpec, ManifestBuilder, TestRoot};
///
/// let root = TestRoot::new();
/// let url = root.publish("sodium.jar", b"sodium");
/// let manifest = root.publish_manifest(
///     &ManifestBuilder::new().entry(EntrySpec::new("Sodium", "sodium.jar", &url, b"sodium")),
/// );
/// root.assert_absent("mods/sodium.jar");
/// ```
pub struct TestRoot {
    temp_dir: TempDir,
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRoot {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("mirror")).unwrap();
        Self { temp_dir }
    }

    /// The managed root. Not created until something writes into it.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("game")
    }

    pub fn mirror(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    /// Serve `content` from the mirror and return its location.
    pub fn publish(&self, name: &str, content: &[u8]) -> String {
        let path = self.mirror().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        location(&path)
    }

    /// Write the manifest document to the mirror and return its location.
    pub fn publish_manifest(&self, manifest: &ManifestBuilder) -> String {
        self.publish("manifest.json", manifest.to_json().as_bytes())
    }

    /// Location of a mirror file that does not exist.
    pub fn unpublished(&self, name: &str) -> String {
        location(&self.mirror().join(name))
    }

    /// Create a file under the managed root.
    pub fn write(&self, relative: &str, content: &[u8]) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.root().join(relative)).unwrap()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }

    pub fn assert_content(&self, relative: &str, expected: &[u8]) {
        let path = self.root().join(relative);
        assert!(path.exists(), "expected {} to exist", path.display());
        assert_eq!(
            fs::read(&path).unwrap(),
            expected,
            "unexpected content in {}",
            path.display()
        );
    }

    pub fn assert_absent(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(!path.exists(), "expected {} to be absent", path.display());
    }

    /// Fail if any `.tmp` staging file is left anywhere under the root.
    pub fn assert_no_staging_files(&self) {
        let leftovers = staging_files(&self.root());
        assert!(leftovers.is_empty(), "staging files left behind: {leftovers:?}");
    }
}

fn location(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn staging_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            found.extend(staging_files(&path));
        } else if path.to_string_lossy().ends_with(".tmp") {
            found.push(path);
        }
    }
    found
}
