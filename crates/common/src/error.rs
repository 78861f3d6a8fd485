//! Common error types for skillgate.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for configuration and input errors.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Common error type for skillgate operations.
///
/// A bundle with error-severity issues is a normal validation result, not an
/// `Error`. Everything here is fatal for the run that produced it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Skill not found: {name} (looked in {})", path.display())]
    BundleNotFound { name: String, path: PathBuf },

    #[error("Check '{check}' failed: {reason}")]
    CheckExecution { check: String, reason: String },

    #[error("Output error: {0}")]
    Formatter(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Shorthand for a formatter or output destination error.
    pub fn formatter(msg: impl Into<String>) -> Self {
        Error::Formatter(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_CONFIG_ERROR
    }
}

/// Result type alias using common Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}
