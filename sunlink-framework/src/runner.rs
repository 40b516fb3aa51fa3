//! Poller runner for lifecycle management.

use std::fmt::Display;
use std::future::Future;

use sunlink_common::{LogGuard, LoggingConfig, init_tracing};
use tokio::signal;

use crate::PollerArgs;
use crate::config::PollerConfig;
use crate::error::{FrameworkError, Result};

/// How a runner stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit<T> {
    /// The worker returned on its own.
    Finished(T),
    /// Ctrl+C was received first.
    Interrupted,
}

/// Runner that manages the lifecycle of a poller process.
///
/// Handles:
/// - Logging initialization (stdout plus history file)
/// - Running the polling worker
/// - Clean shutdown on Ctrl+C
/// - Flushing the history log on exit
///
/// # Example
///
/// ```ignore
/// use sunlink_framework::{PollerArgs, PollerRunner};
///
/// let config: MyConfig = args.load_config()?;
/// let runner = PollerRunner::new_with_args("epever", &config, Some(&args))?;
/// runner.run(async move { supervisor.run(&mut reporter).await }).await?;
/// ```
pub struct PollerRunner {
    /// Poller name for logging.
    name: String,
    /// Flushes the history log when the runner is dropped.
    _log_guard: LogGuard,
}

impl PollerRunner {
    /// Create a runner, initializing logging from `config` with an optional
    /// CLI log level override.
    pub fn new_with_args<C: PollerConfig>(
        name: impl Into<String>,
        config: &C,
        args: Option<&PollerArgs>,
    ) -> Result<Self> {
        let name = name.into();

        // Initialize logging with optional CLI override
        let log_config = match args.and_then(|a| a.log_level.as_ref()) {
            Some(level) => LoggingConfig {
                level: level.clone(),
                ..config.logging().clone()
            },
            None => config.logging().clone(),
        };

        let log_guard = init_tracing(&log_config)?;

        tracing::info!(
            poller = %name,
            version = env!("CARGO_PKG_VERSION"),
            "Starting poller"
        );

        Ok(Self {
            name,
            _log_guard: log_guard,
        })
    }

    /// Run `worker` until it returns or Ctrl+C is received.
    ///
    /// An interrupted worker is dropped, which closes whatever session it
    /// held. A worker error is logged and returned as
    /// [`FrameworkError::Worker`].
    pub async fn run<F, T, E>(self, worker: F) -> Result<RunExit<T>>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        tracing::info!(poller = %self.name, "Poller running. Press Ctrl+C to stop.");

        let exit = tokio::select! {
            result = worker => match result {
                Ok(value) => Ok(RunExit::Finished(value)),
                Err(e) => {
                    tracing::error!(poller = %self.name, error = %e, "Poller failed");
                    Err(FrameworkError::worker(e.to_string()))
                }
            },
            _ = shutdown_signal() => {
                tracing::info!("[EXIT] Program terminated by user.");
                Ok(RunExit::Interrupted)
            }
        };

        tracing::info!(poller = %self.name, "Goodbye!");

        exit
    }
}

/// Resolves on Ctrl+C. If the handler cannot be installed it never resolves.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
