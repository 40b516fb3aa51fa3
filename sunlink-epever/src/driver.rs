//! Modbus RTU session with an EPEVER controller.

use std::time::Duration;

use sunlink_common::MetricValue;
use sunlink_framework::{ConnectionParameters, DeviceLink, LinkConnector, LinkError};
use tokio_modbus::client::{Context, Reader};
use tokio_modbus::prelude::*;
use tracing::debug;

use crate::registers::{Reading, Register, RegisterType, Response};

/// Opens serial sessions (8N1) to the controller.
#[derive(Debug, Clone)]
pub struct EpeverConnector {
    read_timeout: Duration,
}

impl EpeverConnector {
    /// `read_timeout` bounds every single register read.
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl LinkConnector for EpeverConnector {
    type Link = EpeverLink;

    async fn connect(&self, params: &ConnectionParameters) -> Result<EpeverLink, LinkError> {
        let builder = tokio_serial::new(&params.port, params.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .timeout(self.read_timeout);

        let serial = tokio_serial::SerialStream::open(&builder)
            .map_err(|e| LinkError::Connect(format!("Serial open failed: {}", e)))?;

        let ctx = rtu::attach_slave(serial, Slave(params.slave_address));
        debug!("Opened {}", params);

        Ok(EpeverLink {
            ctx,
            timeout: self.read_timeout,
        })
    }
}

/// An open session. Dropping it closes the serial port.
pub struct EpeverLink {
    ctx: Context,
    timeout: Duration,
}

impl EpeverLink {
    async fn fetch(&mut self, register: Register) -> Result<Response, LinkError> {
        let address = register.address;
        let count = register.count();

        match register.register_type {
            RegisterType::Discrete => {
                let bits = self
                    .ctx
                    .read_discrete_inputs(address, count)
                    .await
                    .map_err(|e| LinkError::Read(e.to_string()))?
                    .map_err(|e| LinkError::Exception(format!("{:?}", e)))?;
                Ok(Response::Bits(bits))
            }
            RegisterType::Input => {
                let words = self
                    .ctx
                    .read_input_registers(address, count)
                    .await
                    .map_err(|e| LinkError::Read(e.to_string()))?
                    .map_err(|e| LinkError::Exception(format!("{:?}", e)))?;
                Ok(Response::Words(words))
            }
            RegisterType::Holding => {
                let words = self
                    .ctx
                    .read_holding_registers(address, count)
                    .await
                    .map_err(|e| LinkError::Read(e.to_string()))?
                    .map_err(|e| LinkError::Exception(format!("{:?}", e)))?;
                Ok(Response::Words(words))
            }
        }
    }
}

impl DeviceLink for EpeverLink {
    type Op = Reading;

    async fn read(&mut self, op: Reading) -> Result<MetricValue, LinkError> {
        let register = op.register();
        debug!(
            "Reading {} {:#06x} x{}",
            register.register_type.as_str(),
            register.address,
            register.count()
        );

        let response = tokio::time::timeout(self.timeout, self.fetch(register))
            .await
            .map_err(|_| LinkError::Timeout)??;

        op.decode(&response)
    }
}
