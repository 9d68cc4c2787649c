//! Command implementations for modsync-cli

pub mod sync;

pub use sync::{run_check, run_sync};

use std::path::PathBuf;

use modsync_core::{Mode, ParsePolicy, ReconcileEngine, Settings};
use modsync_fs::NormalizedPath;

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};

/// Everything a command needs once arguments and settings are merged.
#[derive(Debug)]
pub struct Invocation {
    pub manifest: String,
    pub root: NormalizedPath,
    pub mode: Mode,
    pub policy: ParsePolicy,
    pub settings: Settings,
}

impl Invocation {
    /// Merge command-line arguments over the optional settings file.
    pub fn resolve(args: &TargetArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => Settings::load(path).map_err(|e| CliError::usage(e.to_string()))?,
            None => Settings::default(),
        };

        let mode = if args.server {
            Some(Mode::Server)
        } else {
            args.mode.as_deref().map(str::parse::<Mode>).transpose()?
        };

        let overrides = Settings {
            manifest: args.manifest.clone(),
            root: args.root.as_ref().map(|p| p.to_string_lossy().into_owned()),
            mode,
            timeout_secs: args.timeout,
            user_agent: None,
            skip_invalid_entries: args.skip_invalid.then_some(true),
        };
        let settings = file.merge(overrides);

        let manifest = settings
            .manifest
            .clone()
            .ok_or_else(|| CliError::usage("no manifest given (argument or `manifest` setting)"))?;
        let root = settings
            .root
            .clone()
            .map(PathBuf::from)
            .ok_or_else(|| CliError::usage("no managed root given (argument or `root` setting)"))?;

        Ok(Self {
            manifest,
            root: NormalizedPath::new(root),
            mode: settings.mode(),
            policy: settings.parse_policy(),
            settings,
        })
    }

    pub fn engine(&self) -> Result<ReconcileEngine> {
        Ok(ReconcileEngine::with_default_transport(
            self.root.clone(),
            self.mode,
            &self.settings.transport_options(),
        )?)
    }
}
