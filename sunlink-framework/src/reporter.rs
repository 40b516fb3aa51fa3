//! Events emitted by the polling loop and the sinks that receive them.

use std::time::Duration;

use sunlink_common::MetricValue;
use tracing::{error, info, warn};

use crate::link::LinkError;

/// Something the polling loop wants the outside world to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A new connection attempt is starting.
    Connecting { port: String },
    /// The configured port is not in the list of visible ports.
    PortUnavailable {
        port: String,
        available: Vec<String>,
    },
    /// Opening the session failed.
    ConnectFailed { port: String, error: LinkError },
    /// A metric was read.
    Reading {
        label: &'static str,
        value: MetricValue,
    },
    /// A catalog entry has no read operation.
    Unavailable { label: &'static str },
    /// A metric read failed; the current session is abandoned.
    ReadFailed {
        label: &'static str,
        error: LinkError,
    },
    /// The loop will sleep before validating the port again.
    RetryScheduled { port: String, delay: Duration },
    /// A full pass over the catalog finished.
    PassCompleted { readings: usize, skipped: usize },
}

/// Receives [`PollEvent`]s in the order they happen.
pub trait Reporter: Send {
    fn report(&mut self, event: PollEvent);
}

/// Reporter that writes every event to the tracing subscriber.
///
/// Readings are logged as `<label>: <value>` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: PollEvent) {
        match event {
            PollEvent::Connecting { port } => info!("Connecting to {}...", port),
            PollEvent::PortUnavailable { port, available } => error!(
                "Port {} is not available. Available ports: {}",
                port,
                available.join(", ")
            ),
            PollEvent::ConnectFailed { port, error } => {
                error!("Failed to connect to {}: {}", port, error)
            }
            PollEvent::Reading { label, value } => info!("{}: {}", label, value),
            PollEvent::Unavailable { label } => info!("Function {} is not available", label),
            PollEvent::ReadFailed { label, error } => error!("Error calling {}: {}", label, error),
            PollEvent::RetryScheduled { port, delay } => warn!(
                "Retrying connection to {} in {} seconds...",
                port,
                delay.as_secs_f64()
            ),
            PollEvent::PassCompleted { readings, skipped } => {
                tracing::debug!(readings, skipped, "Poll pass completed")
            }
        }
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: PollEvent) {
        (**self).report(event);
    }
}
