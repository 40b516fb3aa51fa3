//! Device session abstractions consumed by the polling loop.
//!
//! The loop never talks to hardware directly. It opens sessions through a
//! [`LinkConnector`], checks the serial port with a [`PortScanner`] first, and
//! issues reads on the resulting [`DeviceLink`].

use std::fmt;
use std::future::Future;

use sunlink_common::MetricValue;
use thiserror::Error;

/// Serial session settings, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// Serial port identifier (e.g. "/dev/ttyUSB0" or "COM4").
    pub port: String,
    /// Line speed.
    pub baud_rate: u32,
    /// Modbus slave address of the controller.
    pub slave_address: u8,
}

impl fmt::Display for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} baud, slave {}",
            self.port, self.baud_rate, self.slave_address
        )
    }
}

/// Failures raised by a device session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Opening the session failed.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A request could not be completed on the wire.
    #[error("Read failed: {0}")]
    Read(String),

    /// The device answered with a Modbus exception.
    #[error("Device exception: {0}")]
    Exception(String),

    /// The device did not answer in time.
    #[error("Request timed out")]
    Timeout,

    /// The response could not be turned into a value.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Enumerating serial ports failed.
    #[error("Port scan failed: {0}")]
    PortScan(String),
}

/// An open session to a device.
///
/// A link is single-use in the face of errors: once any read fails the caller
/// drops it and opens a new one.
pub trait DeviceLink: Send {
    /// Identifier of a read operation this link understands.
    type Op: Copy + Send + Sync + 'static;

    /// Perform one blocking request/response read.
    fn read(&mut self, op: Self::Op) -> impl Future<Output = Result<MetricValue, LinkError>> + Send;
}

/// Opens new [`DeviceLink`]s.
pub trait LinkConnector: Send + Sync {
    /// The session type produced by this connector.
    type Link: DeviceLink;

    /// Open a fresh session using `params`.
    fn connect(
        &self,
        params: &ConnectionParameters,
    ) -> impl Future<Output = Result<Self::Link, LinkError>> + Send;
}

/// Lists the serial ports currently visible to the OS.
pub trait PortScanner: Send + Sync {
    fn available_ports(&self) -> Result<Vec<String>, LinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_display() {
        let params = ConnectionParameters {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            slave_address: 1,
        };
        assert_eq!(params.to_string(), "/dev/ttyUSB0 @ 115200 baud, slave 1");
    }

    #[test]
    fn test_link_error_messages() {
        assert_eq!(LinkError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            LinkError::Exception("IllegalDataAddress".to_string()).to_string(),
            "Device exception: IllegalDataAddress"
        );
    }
}
