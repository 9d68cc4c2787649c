//! Error types for modsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Process exit status for a run that could not start or could not finish.
pub const EXIT_FATAL: i32 = 1;
/// Process exit status for bad arguments or settings.
pub const EXIT_USAGE: i32 = 2;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from modsync-core
    #[error(transparent)]
    Core(#[from] modsync_core::Error),

    /// JSON output could not be rendered
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Logging could not be set up
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Bad arguments or settings
    #[error("{message}")]
    Usage { message: String },
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. }
            | CliError::Core(modsync_core::Error::InvalidMode { .. })
            | CliError::Core(modsync_core::Error::ConfigParse { .. })
            | CliError::Core(modsync_core::Error::UnsupportedConfigFormat { .. }) => EXIT_USAGE,
            _ => EXIT_FATAL,
        }
    }
}
