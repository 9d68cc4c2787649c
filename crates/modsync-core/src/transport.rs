//! Transport: retrieving the manifest and downloading entry content
//!
//! [`Transport`] is the seam between the engine and the network. The engine
//! only needs two things: the whole manifest as bytes, and an entry's content
//! streamed into a writer. [`DefaultTransport`] picks HTTP or the local
//! filesystem by the location's scheme.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, ClientBuilder};
use tracing::debug;

/// Errors raised while fetching or downloading.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("transfer from {location} interrupted: {source}")]
    Stream {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported location: {0}")]
    Unsupported(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Source of manifest documents and entry payloads.
pub trait Transport {
    /// Retrieve the complete document at `location`.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError>;

    /// Stream the content at `location` into `sink`, returning the byte count.
    ///
    /// Implementations must not buffer the whole payload in memory.
    fn download(&self, location: &str, sink: &mut dyn Write) -> Result<u64, TransportError>;
}

/// Tunables for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Limit on a whole request, from connecting until the last body byte.
    /// `None` lets large downloads run as long as they keep going.
    pub timeout: Option<Duration>,
    /// Limit on establishing the connection alone
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(60)),
            connect_timeout: Duration::from_secs(15),
            user_agent: concat!("modsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP(S) transport backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        let client = client_builder(options)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn client_builder(options: &TransportOptions) -> ClientBuilder {
    Client::builder()
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .user_agent(options.user_agent.clone())
}

impl Transport for HttpTransport {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url = location, "Fetching");
        let bytes = self
            .get(location)?
            .bytes()
            .map_err(|e| TransportError::Request {
                url: location.to_string(),
                message: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }

    fn download(&self, location: &str, sink: &mut dyn Write) -> Result<u64, TransportError> {
        debug!(url = location, "Downloading");
        let mut response = self.get(location)?;
        io::copy(&mut response, sink).map_err(|source| TransportError::Stream {
            location: location.to_string(),
            source,
        })
    }
}

/// Local transport for `file://` URLs and plain filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl FileTransport {
    /// Resolve a location to a local path.
    pub fn resolve(location: &str) -> Result<PathBuf, TransportError> {
        if has_scheme(location, "file") {
            let url = Url::parse(location)
                .map_err(|_| TransportError::Unsupported(location.to_string()))?;
            return url
                .to_file_path()
                .map_err(|_| TransportError::Unsupported(location.to_string()));
        }
        Ok(PathBuf::from(location))
    }
}

impl Transport for FileTransport {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError> {
        let path = Self::resolve(location)?;
        fs::read(&path).map_err(|source| TransportError::File { path, source })
    }

    fn download(&self, location: &str, sink: &mut dyn Write) -> Result<u64, TransportError> {
        let path = Self::resolve(location)?;
        let mut file = File::open(&path).map_err(|source| TransportError::File {
            path: path.clone(),
            source,
        })?;
        io::copy(&mut file, sink).map_err(|source| TransportError::Stream {
            location: location.to_string(),
            source,
        })
    }
}

/// Dispatches `http://` and `https://` locations to [`HttpTransport`] and
/// everything else to [`FileTransport`].
#[derive(Debug, Clone)]
pub struct DefaultTransport {
    http: HttpTransport,
    file: FileTransport,
}

impl DefaultTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpTransport::new(options)?,
            file: FileTransport,
        })
    }

    fn route(&self, location: &str) -> &dyn Transport {
        if is_http(location) {
            &self.http
        } else {
            &self.file
        }
    }
}

impl Transport for DefaultTransport {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError> {
        self.route(location).fetch(location)
    }

    fn download(&self, location: &str, sink: &mut dyn Write) -> Result<u64, TransportError> {
        self.route(location).download(location, sink)
    }
}

fn has_scheme(location: &str, scheme: &str) -> bool {
    location
        .split_once("://")
        .is_some_and(|(s, _)| s.eq_ignore_ascii_case(scheme))
}

/// Whether `location` should go over HTTP.
pub fn is_http(location: &str) -> bool {
    has_scheme(location, "http") || has_scheme(location, "https")
}
