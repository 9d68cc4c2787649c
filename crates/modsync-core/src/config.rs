//! Run settings loaded from a TOML or JSON file
//!
//! Every field is optional. Values given on the command line are layered on
//! top with [`Settings::merge`]; anything still unset falls back to the
//! built-in default.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manifest::ParsePolicy;
use crate::transport::TransportOptions;
use crate::{Error, Mode, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manifest URL or path
    pub manifest: Option<String>,
    /// Managed root directory
    pub root: Option<String>,
    pub mode: Option<Mode>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub skip_invalid_entries: Option<bool>,
}

impl Settings {
    /// Load settings from `path`, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let content = fs::read_to_string(path).map_err(|e| modsync_fs::Error::io(path, e))?;

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedConfigFormat { extension }),
        }
    }

    /// Overlay `overrides` on `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            manifest: overrides.manifest.or(self.manifest),
            root: overrides.root.or(self.root),
            mode: overrides.mode.or(self.mode),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            user_agent: overrides.user_agent.or(self.user_agent),
            skip_invalid_entries: overrides.skip_invalid_entries.or(self.skip_invalid_entries),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    pub fn parse_policy(&self) -> ParsePolicy {
        if self.skip_invalid_entries.unwrap_or(false) {
            ParsePolicy::SkipInvalid
        } else {
            ParsePolicy::Strict
        }
    }

    /// `timeout_secs = 0` removes the whole-request limit.
    pub fn transport_options(&self) -> TransportOptions {
        let defaults = TransportOptions::default();
        TransportOptions {
            timeout: match self.timeout_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.timeout,
            },
            connect_timeout: defaults.connect_timeout,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}
