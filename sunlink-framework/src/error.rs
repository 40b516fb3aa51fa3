//! Error types for the poller framework.

use thiserror::Error;

/// Result type alias using [`FrameworkError`].
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// Errors that can occur while setting up or running a poller.
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Logging could not be set up.
    #[error("Logging error: {0}")]
    Logging(String),

    /// The polling worker stopped with an error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameworkError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

impl From<sunlink_common::Error> for FrameworkError {
    fn from(err: sunlink_common::Error) -> Self {
        match err {
            sunlink_common::Error::Config(msg) => Self::Config(msg),
            sunlink_common::Error::Logging(msg) => Self::Logging(msg),
            sunlink_common::Error::Io(e) => Self::Io(e),
        }
    }
}
