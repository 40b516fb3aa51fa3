use thiserror::Error;

/// Common error type for SunLink components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using SunLink's Error.
pub type Result<T> = std::result::Result<T, Error>;
