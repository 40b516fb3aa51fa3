//! SunLink Common Library
//!
//! This crate provides shared types and utilities for SunLink pollers:
//!
//! - [`telemetry`] - Decoded reading model (`MetricValue`)
//! - [`config`] - Configuration loading (JSON5 format) and logging settings
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod telemetry;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

// Re-export commonly used types at the crate root
pub use config::{DEFAULT_HISTORY_LOG, LogFormat, LoggingConfig, parse_config};
pub use error::{Error, Result};
pub use telemetry::MetricValue;

/// Keeps the history-file writer alive.
///
/// Dropping the guard flushes any buffered log lines, so hold it until the
/// process is about to exit.
#[must_use = "dropping the guard stops the history log writer"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize tracing with the given configuration.
///
/// Events go to stdout and, when `config.file` is set, are appended to that
/// file as well (never rotated, created on first use).
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use sunlink_common::{LoggingConfig, init_tracing};
///
/// let _guard = init_tracing(&LoggingConfig::default())?;
/// tracing::info!("Solar Voltage: 18.4");
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<LogGuard> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_writer, guard) = match &config.file {
        Some(path) => {
            let (directory, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let init = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(file_writer.map(|w| fmt::layer().json().with_writer(w)))
            .with(filter)
            .try_init(),
    };
    init.map_err(|e| Error::Logging(format!("Failed to initialize tracing: {}", e)))?;

    if let Some(path) = &config.file {
        tracing::debug!(file = %path.display(), "History log enabled");
    }

    Ok(LogGuard { _file: guard })
}

/// Split a log file path into the directory and file name the appender wants.
fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path.file_name().ok_or_else(|| {
        Error::Config(format!("Log file path '{}' has no file name", path.display()))
    })?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((directory, file_name))
}
