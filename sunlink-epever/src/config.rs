//! Configuration for the EPEVER poller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sunlink_framework::{
    ConnectionParameters, FrameworkError, LoggingConfig, PollerConfig, PollingConfig, Result,
};

use crate::catalog::is_known_label;

/// Complete poller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpeverConfig {
    /// Serial link settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Poll interval and reconnect behaviour
    #[serde(default)]
    pub polling: PollingConfig,

    /// Catalog labels to report as unavailable instead of reading
    #[serde(default)]
    pub disabled_metrics: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Serial port (e.g. "/dev/ttyUSB0" or "COM4"); `--comport` wins
    #[serde(default)]
    pub port: Option<String>,

    /// Line speed (default: 115200)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Modbus slave address, 1-247 (default: 1)
    #[serde(default = "default_slave_address")]
    pub slave_address: u8,

    /// Timeout for a single read in milliseconds (default: 1000)
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    115200
}

fn default_slave_address() -> u8 {
    1
}

fn default_read_timeout() -> u64 {
    1000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            slave_address: default_slave_address(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl ConnectionConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl EpeverConfig {
    /// Apply command line overrides. `None` keeps the file value.
    pub fn apply_overrides(
        &mut self,
        port: Option<String>,
        baud_rate: Option<u32>,
        slave_address: Option<u8>,
    ) {
        if let Some(port) = port {
            self.connection.port = Some(port);
        }
        if let Some(baud_rate) = baud_rate {
            self.connection.baud_rate = baud_rate;
        }
        if let Some(slave_address) = slave_address {
            self.connection.slave_address = slave_address;
        }
    }

    /// Session settings for the supervisor.
    pub fn connection_parameters(&self) -> Result<ConnectionParameters> {
        let port = self
            .connection
            .port
            .clone()
            .ok_or_else(|| FrameworkError::config("No serial port given (use --comport)"))?;

        Ok(ConnectionParameters {
            port,
            baud_rate: self.connection.baud_rate,
            slave_address: self.connection.slave_address,
        })
    }
}

impl PollerConfig for EpeverConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    fn validate(&self) -> Result<()> {
        if let Some(port) = &self.connection.port {
            if port.trim().is_empty() {
                return Err(FrameworkError::validation("Serial port cannot be empty"));
            }
        }

        if self.connection.baud_rate == 0 {
            return Err(FrameworkError::validation("baud_rate must be > 0"));
        }

        if !(1..=247).contains(&self.connection.slave_address) {
            return Err(FrameworkError::validation(format!(
                "slave_address must be 1-247, got {}",
                self.connection.slave_address
            )));
        }

        if self.connection.read_timeout_ms == 0 {
            return Err(FrameworkError::validation("read_timeout_ms must be > 0"));
        }

        if self.polling.retry_delay_secs == 0 {
            return Err(FrameworkError::validation("retry_delay_secs must be > 0"));
        }

        for label in &self.disabled_metrics {
            if !is_known_label(label) {
                return Err(FrameworkError::validation(format!(
                    "disabled_metrics: unknown metric '{}'",
                    label
                )));
            }
        }

        Ok(())
    }
}
