//! SunLink poller for EPEVER Tracer solar charge controllers.
//!
//! Reads live data, statistics and settings from the controller over
//! Modbus RTU and logs every value, reconnecting whenever the serial
//! link drops.
//!
//! # Metrics
//!
//! The catalog ([`catalog::epever_catalog`]) lists 58 labelled values,
//! read in a fixed order. Each maps to a [`registers::Reading`] that knows
//! its register block, address and encoding:
//!
//! - `input` registers (`0x3000`..) hold live data and statistics
//! - `holding` registers (`0x9000`..) hold battery settings and the clock
//! - `discrete` inputs (`0x2000`..) hold the day/night and temperature flags

pub mod catalog;
pub mod config;
pub mod driver;
pub mod ports;
pub mod registers;
