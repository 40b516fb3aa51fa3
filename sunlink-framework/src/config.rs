//! Configuration traits and utilities.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::LoggingConfig;
use crate::error::{FrameworkError, Result};

/// What to do when the configured port is not visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPortPolicy {
    /// Stop with an error without trying to connect (default).
    #[default]
    Fail,
    /// Treat it like a connection failure: wait and check again.
    Retry,
}

/// Timing and recovery settings for the polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Pause between completed passes, in seconds (default: 10).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Fixed pause before every reconnect attempt, in seconds (default: 5).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Reaction to a port that is not plugged in.
    #[serde(default)]
    pub missing_port: MissingPortPolicy,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            retry_delay_secs: default_retry_delay(),
            missing_port: MissingPortPolicy::default(),
        }
    }
}

impl PollingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Trait for poller configuration types.
///
/// Implement this trait for a device's configuration struct to get
/// file loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use sunlink_framework::{LoggingConfig, PollerConfig, PollingConfig};
///
/// #[derive(Debug, Deserialize)]
/// pub struct MyDeviceConfig {
///     pub logging: LoggingConfig,
///     pub polling: PollingConfig,
/// }
///
/// impl PollerConfig for MyDeviceConfig {
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
///
///     fn polling(&self) -> &PollingConfig {
///         &self.polling
///     }
/// }
/// ```
pub trait PollerConfig: Sized + DeserializeOwned {
    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Get the polling loop configuration.
    fn polling(&self) -> &PollingConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Override to add custom validation.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FrameworkError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = sunlink_common::parse_config(&content)
            .map_err(|e| FrameworkError::ConfigParse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        logging: LoggingConfig,
        #[serde(default)]
        polling: PollingConfig,
    }

    impl PollerConfig for TestConfig {
        fn logging(&self) -> &LoggingConfig {
            &self.logging
        }

        fn polling(&self) -> &PollingConfig {
            &self.polling
        }

        fn validate(&self) -> Result<()> {
            if self.polling.retry_delay_secs == 0 {
                return Err(FrameworkError::validation("retry_delay_secs must be > 0"));
            }
            Ok(())
        }
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_not_found() {
        let result = TestConfig::load("/nonexistent/path.json5");
        assert!(matches!(result, Err(FrameworkError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_polling_defaults() {
        let file = write_config("{}");
        let config = TestConfig::load(file.path()).unwrap();

        assert_eq!(config.polling().poll_interval(), Duration::from_secs(10));
        assert_eq!(config.polling().retry_delay(), Duration::from_secs(5));
        assert_eq!(config.polling().missing_port, MissingPortPolicy::Fail);
    }

    #[test]
    fn test_load_overrides() {
        let file = write_config(
            r#"{
                polling: { poll_interval_secs: 30, missing_port: "retry" },
                logging: { level: "debug" },
            }"#,
        );
        let config = TestConfig::load(file.path()).unwrap();

        assert_eq!(config.polling().poll_interval_secs, 30);
        assert_eq!(config.polling().retry_delay_secs, 5);
        assert_eq!(config.polling().missing_port, MissingPortPolicy::Retry);
        assert_eq!(config.logging().level, "debug");
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("{ polling: ");
        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(FrameworkError::ConfigParse(_))));
    }

    #[test]
    fn test_validation_runs_after_load() {
        let file = write_config("{ polling: { retry_delay_secs: 0 } }");
        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(FrameworkError::ConfigValidation(_))));
    }
}
