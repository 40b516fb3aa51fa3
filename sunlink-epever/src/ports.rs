//! Serial port enumeration.

use sunlink_framework::{LinkError, PortScanner};

/// Lists the serial ports the operating system currently exposes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortScanner;

impl PortScanner for SerialPortScanner {
    fn available_ports(&self) -> Result<Vec<String>, LinkError> {
        tokio_serial::available_ports()
            .map(|ports| ports.into_iter().map(|port| port.port_name).collect())
            .map_err(|e| LinkError::PortScan(e.to_string()))
    }
}
