//! Connection lifecycle: port check, connect, poll, and reconnect on failure.
//!
//! The supervisor is an explicit loop over `LinkState`:
//!
//! ```text
//! Validating -> Connecting -> Polling -> Idle -> Polling ...
//!      ^             |            |
//!      |             v            v
//!      +-------- Backoff <--------+
//! ```
//!
//! Any read failure drops the live link and goes through `Backoff`, which
//! always waits the fixed retry delay before the port is checked again.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{MissingPortPolicy, PollingConfig};
use crate::executor::{PassOutcome, PollExecutor};
use crate::link::{ConnectionParameters, DeviceLink, LinkConnector, PortScanner};
use crate::reporter::{PollEvent, Reporter};

/// Errors that end a supervisor run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupervisorError {
    #[error("Port {port} is not available. Available ports: {}", .available.join(", "))]
    PortUnavailable {
        port: String,
        available: Vec<String>,
    },
}

/// Whether the supervisor keeps polling after a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Poll forever, pausing the poll interval between passes.
    #[default]
    Continuous,
    /// Return after the first completed pass.
    Once,
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorExit {
    /// Completed passes.
    pub passes: u64,
    /// Successful connects after the first one.
    pub reconnects: u64,
}

enum LinkState<L> {
    Validating,
    Connecting,
    Polling(L),
    Idle(L),
    Backoff,
}

/// Owns the reconnect loop for one device.
pub struct ConnectionSupervisor<C: LinkConnector, S> {
    params: ConnectionParameters,
    connector: C,
    scanner: S,
    executor: PollExecutor<<C::Link as DeviceLink>::Op>,
    settings: PollingConfig,
    mode: RunMode,
}

impl<C, S> ConnectionSupervisor<C, S>
where
    C: LinkConnector,
    S: PortScanner,
{
    pub fn new(
        params: ConnectionParameters,
        connector: C,
        scanner: S,
        executor: PollExecutor<<C::Link as DeviceLink>::Op>,
        settings: PollingConfig,
    ) -> Self {
        Self {
            params,
            connector,
            scanner,
            executor,
            settings,
            mode: RunMode::default(),
        }
    }

    /// Set the run mode.
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drive the state machine.
    ///
    /// Only returns in [`RunMode::Once`] after a completed pass, or with an
    /// error when the port is missing under [`MissingPortPolicy::Fail`].
    pub async fn run<R>(&self, reporter: &mut R) -> Result<SupervisorExit, SupervisorError>
    where
        R: Reporter + ?Sized,
    {
        let mut exit = SupervisorExit::default();
        let mut connected_before = false;
        let mut state = LinkState::Validating;

        loop {
            state = match state {
                LinkState::Validating => match self.check_port() {
                    Ok(()) => LinkState::Connecting,
                    Err(available) => {
                        reporter.report(PollEvent::PortUnavailable {
                            port: self.params.port.clone(),
                            available: available.clone(),
                        });
                        match self.settings.missing_port {
                            MissingPortPolicy::Fail => {
                                return Err(SupervisorError::PortUnavailable {
                                    port: self.params.port.clone(),
                                    available,
                                });
                            }
                            MissingPortPolicy::Retry => LinkState::Backoff,
                        }
                    }
                },
                LinkState::Connecting => {
                    reporter.report(PollEvent::Connecting {
                        port: self.params.port.clone(),
                    });
                    match self.connector.connect(&self.params).await {
                        Ok(link) => {
                            if connected_before {
                                exit.reconnects += 1;
                            }
                            connected_before = true;
                            debug!(params = %self.params, "Link established");
                            LinkState::Polling(link)
                        }
                        Err(error) => {
                            reporter.report(PollEvent::ConnectFailed {
                                port: self.params.port.clone(),
                                error,
                            });
                            LinkState::Backoff
                        }
                    }
                }
                LinkState::Polling(mut link) => {
                    match self.executor.run_pass(&mut link, &mut *reporter).await {
                        PassOutcome::Completed { .. } => {
                            exit.passes += 1;
                            match self.mode {
                                RunMode::Once => return Ok(exit),
                                RunMode::Continuous => LinkState::Idle(link),
                            }
                        }
                        PassOutcome::ReadFailed { label, .. } => {
                            debug!(label, "Discarding link after failed read");
                            drop(link);
                            LinkState::Backoff
                        }
                    }
                }
                LinkState::Idle(link) => {
                    tokio::time::sleep(self.settings.poll_interval()).await;
                    LinkState::Polling(link)
                }
                LinkState::Backoff => {
                    let delay = self.settings.retry_delay();
                    reporter.report(PollEvent::RetryScheduled {
                        port: self.params.port.clone(),
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                    LinkState::Validating
                }
            };
        }
    }

    /// Check that the configured port is visible; returns the visible set otherwise.
    fn check_port(&self) -> Result<(), Vec<String>> {
        let available = match self.scanner.available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                warn!("Port scan failed, treating as no ports: {}", e);
                Vec::new()
            }
        };

        if available.iter().any(|p| *p == self.params.port) {
            Ok(())
        } else {
            debug!(port = %self.params.port, visible = available.len(), "Configured port not found");
            Err(available)
        }
    }
}
