//! Builders for manifest JSON documents.

use serde_json::{Value, json};

/// MD5 of `content` as lowercase hex.
pub fn md5_hex(content: &[u8]) -> String {
    modsync_fs::compute_content_digest(content)
}

/// One manifest entry, defaulting to a client-only mod in `mods/`.
#[derive(Debug, Clone)]
pub struct EntrySpec {
    pub url: String,
    pub name: String,
    pub version: String,
    pub filename: String,
    pub content_hash: String,
    pub destination: String,
    pub server: bool,
    pub client: bool,
    pub deprecated: bool,
}

impl EntrySpec {
    /// An entry whose hash matches `content`.
    pub fn new(name: &str, filename: &str, url: &str, content: &[u8]) -> Self {
        Self {
            url: url.to_string(),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            filename: filename.to_string(),
            content_hash: md5_hex(content),
            destination: "mods".to_string(),
            server: false,
            client: true,
            deprecated: false,
        }
    }

    pub fn destination(mut self, destination: &str) -> Self {
        self.destination = destination.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn hash(mut self, hash: &str) -> Self {
        self.content_hash = hash.to_string();
        self
    }

    pub fn server(mut self, server: bool) -> Self {
        self.server = server;
        self
    }

    pub fn client(mut self, client: bool) -> Self {
        self.client = client;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "url": self.url,
            "name": self.name,
            "version": self.version,
            "filename": self.filename,
            "contentHash": self.content_hash,
            "destinationSubpath": self.destination,
            "appliesToServer": self.server,
            "appliesToClient": self.client,
            "deprecated": self.deprecated,
        })
    }

    /// Same entry using the legacy short field names.
    pub fn to_legacy_json(&self) -> Value {
        json!({
            "url": self.url,
            "name": self.name,
            "version": self.version,
            "filename": self.filename,
            "md5": self.content_hash,
            "destination": self.destination,
            "server": self.server,
            "client": self.client,
            "deprecated": self.deprecated,
        })
    }
}

/// Collects entries (or raw JSON values) into a manifest document.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    values: Vec<Value>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: EntrySpec) -> Self {
        self.values.push(entry.to_json());
        self
    }

    pub fn legacy_entry(mut self, entry: EntrySpec) -> Self {
        self.values.push(entry.to_legacy_json());
        self
    }

    /// Append an arbitrary value, e.g. a deliberately broken entry.
    pub fn raw(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    pub fn to_json(&self) -> String {
        Value::Array(self.values.clone()).to_string()
    }
}
