//! SunLink Poller Framework
//!
//! The resilient polling loop shared by SunLink device pollers.
//!
//! # Overview
//!
//! This framework provides:
//! - [`DeviceLink`], [`LinkConnector`] and [`PortScanner`], the device-side seams
//! - [`MetricCatalog`], the ordered table of metrics to read
//! - [`PollExecutor`], one sequential pass over the catalog
//! - [`ConnectionSupervisor`], the validate / connect / poll / backoff loop
//! - [`Reporter`] and [`TracingReporter`] for emitting readings and lifecycle events
//! - [`PollerConfig`] for configuration loading and validation
//! - [`PollerRunner`] for process lifecycle (logging, Ctrl+C)
//! - [`PollerArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use sunlink_framework::{ConnectionSupervisor, PollExecutor, PollerRunner, TracingReporter};
//!
//! let runner = PollerRunner::new_with_args("epever", &config, Some(&args))?;
//! let supervisor = ConnectionSupervisor::new(params, connector, scanner, executor, polling);
//!
//! let mut reporter = TracingReporter;
//! runner.run(async move { supervisor.run(&mut reporter).await }).await?;
//! ```

mod args;
mod catalog;
mod config;
mod error;
mod executor;
mod link;
mod reporter;
mod runner;
mod supervisor;

pub use args::PollerArgs;
pub use catalog::{CatalogError, MetricCatalog, MetricDescriptor};
pub use config::{MissingPortPolicy, PollerConfig, PollingConfig};
pub use error::{FrameworkError, Result};
pub use executor::{PassOutcome, PollExecutor};
pub use link::{ConnectionParameters, DeviceLink, LinkConnector, LinkError, PortScanner};
pub use reporter::{PollEvent, Reporter, TracingReporter};
pub use runner::{PollerRunner, RunExit};
pub use supervisor::{ConnectionSupervisor, RunMode, SupervisorError, SupervisorExit};

// Re-export commonly used types from sunlink-common
pub use sunlink_common::{LogFormat, LoggingConfig, MetricValue};
