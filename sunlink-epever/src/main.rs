//! SunLink poller for EPEVER Tracer solar charge controllers.
//!
//! Reads every catalog metric over Modbus RTU, logs it to stdout and the
//! history file, and reconnects whenever the serial link fails.

use anyhow::{Context, Result};
use clap::Parser;
use sunlink_epever::catalog::epever_catalog;
use sunlink_epever::config::EpeverConfig;
use sunlink_epever::driver::EpeverConnector;
use sunlink_epever::ports::SerialPortScanner;
use sunlink_framework::{
    ConnectionSupervisor, PollExecutor, PollerArgs, PollerConfig, PollerRunner, SupervisorError,
    TracingReporter,
};
use tracing::info;

/// Modbus RTU poller for EPEVER Tracer charge controllers.
#[derive(Parser, Debug)]
#[command(name = "sunlink-epever")]
#[command(about = "Polls an EPEVER charge controller over Modbus RTU")]
#[command(version)]
#[command(after_help = "Example: sunlink-epever --comport /dev/ttyUSB0 --baudrate 115200 --slaveaddress 1")]
struct Args {
    /// Serial port of the controller (e.g. COM4 or /dev/ttyUSB0).
    #[arg(long, required_unless_present = "config")]
    comport: Option<String>,

    /// Baud rate [default: 115200].
    #[arg(long)]
    baudrate: Option<u32>,

    /// Modbus slave address [default: 1].
    #[arg(long)]
    slaveaddress: Option<u8>,

    #[command(flatten)]
    common: PollerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config: EpeverConfig = args
        .common
        .load_config()
        .context("Failed to load configuration")?;
    config.apply_overrides(args.comport.clone(), args.baudrate, args.slaveaddress);
    config
        .validate()
        .context("Invalid command line arguments")?;

    let params = config.connection_parameters()?;
    let catalog = epever_catalog()?
        .disable(config.disabled_metrics.iter().map(String::as_str))
        .context("Failed to build metric catalog")?;

    let connector = EpeverConnector::new(config.connection.read_timeout());
    let polling = config.polling.clone();

    let runner = PollerRunner::new_with_args("epever", &config, Some(&args.common))
        .context("Failed to start poller")?;

    info!(
        "Polling {} ({} metrics, every {}s)",
        params,
        catalog.len(),
        polling.poll_interval_secs
    );

    let supervisor = ConnectionSupervisor::new(
        params,
        connector,
        SerialPortScanner,
        PollExecutor::new(catalog),
        polling,
    )
    .with_mode(args.common.run_mode());

    runner
        .run(async move {
            let mut reporter = TracingReporter;
            let exit = supervisor.run(&mut reporter).await?;
            info!(
                passes = exit.passes,
                reconnects = exit.reconnects,
                "Polling finished"
            );
            Ok::<_, SupervisorError>(exit)
        })
        .await?;

    Ok(())
}
