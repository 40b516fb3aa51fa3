//! CLI arguments shared by all pollers.

use std::path::PathBuf;

use clap::Args;

use crate::config::PollerConfig;
use crate::error::Result;
use crate::supervisor::RunMode;

/// Common CLI arguments, flattened into each poller's own argument struct.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PollerArgs {
    /// Optional configuration file (JSON5 format).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Stop after the first complete pass instead of polling forever.
    #[arg(long)]
    pub once: bool,
}

impl PollerArgs {
    pub fn run_mode(&self) -> RunMode {
        if self.once {
            RunMode::Once
        } else {
            RunMode::Continuous
        }
    }

    /// Load the configuration file if one was given, defaults otherwise.
    ///
    /// Defaults are validated the same way a loaded file is.
    pub fn load_config<C: PollerConfig + Default>(&self) -> Result<C> {
        match &self.config {
            Some(path) => C::load(path),
            None => {
                let config = C::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}
