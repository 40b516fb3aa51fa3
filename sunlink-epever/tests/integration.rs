//! End-to-end tests of the EPEVER catalog and decoders against a simulated
//! controller register file.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sunlink_epever::catalog::epever_catalog;
use sunlink_epever::config::EpeverConfig;
use sunlink_epever::registers::{Reading, RegisterType, Response};
use sunlink_framework::{
    ConnectionParameters, ConnectionSupervisor, DeviceLink, LinkConnector, LinkError,
    MetricValue, PollEvent, PollExecutor, PollerConfig, PollingConfig, PortScanner, Reporter,
    RunMode,
};
use tokio_test::{assert_err, assert_ok};

/// Register contents of a simulated controller.
#[derive(Default)]
struct RegisterFile {
    words: HashMap<(RegisterType, u16), u16>,
    bits: HashMap<u16, bool>,
    /// Addresses answering with an exception until cleared.
    faulty: HashSet<u16>,
}

impl RegisterFile {
    fn typical() -> Self {
        let mut file = Self::default();
        let mut input = |address: u16, value: u16| {
            file.words.insert((RegisterType::Input, address), value);
        };
        input(0x3100, 1834); // 18.34 V
        input(0x3101, 250); // 2.5 A
        input(0x3102, 4585); // 45.85 W
        input(0x3103, 0);
        input(0x311A, 87); // 87 %
        input(0x3110, (-150i16) as u16); // -1.5 C
        input(0x3201, (2 << 2) | 1); // boost, running

        let mut holding = |address: u16, value: u16| {
            file.words.insert((RegisterType::Holding, address), value);
        };
        holding(0x9000, 3); // FLOODED
        holding(0x9001, 200); // 200 Ah
        for (i, address) in (0x9003..=0x900E).enumerate() {
            holding(address, 1600 - i as u16 * 50);
        }
        holding(0x9013, (30 << 8) | 15); // 00:30:15
        holding(0x9014, (3 << 8) | 8); // 08h, 3rd
        holding(0x9015, (25 << 8) | 2); // February 2025

        file.bits.insert(0x200C, true);
        file
    }

    fn answer(&self, reading: Reading) -> Result<Response, LinkError> {
        let register = reading.register();
        let addresses = register.address..register.address + register.count();

        if addresses.clone().any(|a| self.faulty.contains(&a)) {
            return Err(LinkError::Exception("IllegalDataAddress".to_string()));
        }

        Ok(match register.register_type {
            RegisterType::Discrete => Response::Bits(
                addresses
                    .map(|a| self.bits.get(&a).copied().unwrap_or(false))
                    .collect(),
            ),
            kind => Response::Words(
                addresses
                    .map(|a| self.words.get(&(kind, a)).copied().unwrap_or(0))
                    .collect(),
            ),
        })
    }
}

#[derive(Clone)]
struct SimulatedController {
    registers: Arc<Mutex<RegisterFile>>,
    connects: Arc<Mutex<u32>>,
}

impl SimulatedController {
    fn new(registers: RegisterFile) -> Self {
        Self {
            registers: Arc::new(Mutex::new(registers)),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    fn connects(&self) -> u32 {
        *self.connects.lock().unwrap()
    }
}

struct SimulatedLink {
    registers: Arc<Mutex<RegisterFile>>,
}

impl DeviceLink for SimulatedLink {
    type Op = Reading;

    async fn read(&mut self, op: Reading) -> Result<MetricValue, LinkError> {
        let response = {
            let mut registers = self.registers.lock().unwrap();
            let response = registers.answer(op);
            // A faulty register recovers once it has failed.
            if response.is_err() {
                registers.faulty.clear();
            }
            response?
        };
        op.decode(&response)
    }
}

impl LinkConnector for SimulatedController {
    type Link = SimulatedLink;

    async fn connect(&self, _params: &ConnectionParameters) -> Result<SimulatedLink, LinkError> {
        *self.connects.lock().unwrap() += 1;
        Ok(SimulatedLink {
            registers: Arc::clone(&self.registers),
        })
    }
}

struct Ports(Vec<String>);

impl PortScanner for Ports {
    fn available_ports(&self) -> Result<Vec<String>, LinkError> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct Recorder {
    events: Vec<PollEvent>,
}

impl Reporter for Recorder {
    fn report(&mut self, event: PollEvent) {
        self.events.push(event);
    }
}

impl Recorder {
    fn values(&self) -> Vec<(&'static str, MetricValue)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PollEvent::Reading { label, value } => Some((*label, value.clone())),
                _ => None,
            })
            .collect()
    }

    fn value(&self, label: &str) -> Option<MetricValue> {
        self.values()
            .into_iter()
            .rev()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v)
    }
}

fn params() -> ConnectionParameters {
    ConnectionParameters {
        port: "/dev/ttyUSB0".to_string(),
        baud_rate: 115200,
        slave_address: 1,
    }
}

fn supervisor(
    controller: SimulatedController,
    disabled: &[&str],
) -> ConnectionSupervisor<SimulatedController, Ports> {
    let catalog = epever_catalog()
        .unwrap()
        .disable(disabled.iter().copied())
        .unwrap();

    ConnectionSupervisor::new(
        params(),
        controller,
        Ports(vec!["/dev/ttyUSB0".to_string()]),
        PollExecutor::new(catalog),
        PollingConfig::default(),
    )
    .with_mode(RunMode::Once)
}

#[test]
fn test_catalog_order() {
    let catalog = epever_catalog().unwrap();
    let labels: Vec<_> = catalog.labels().collect();

    assert_eq!(labels.len(), 58);
    assert_eq!(labels.iter().collect::<HashSet<_>>().len(), 58);
    assert_eq!(labels[0], "Solar Voltage");
    assert_eq!(labels[16], "Is Day");
    assert_eq!(labels[27], "Battery Voltage Control Registers");
    assert_eq!(labels[57], "Real Time Clock (RTC)");
}

#[tokio::test(start_paused = true)]
async fn test_full_pass_against_controller() {
    let controller = SimulatedController::new(RegisterFile::typical());
    let mut recorder = Recorder::default();

    let exit = assert_ok!(supervisor(controller.clone(), &[]).run(&mut recorder).await);
    assert_eq!(exit.passes, 1);
    assert_eq!(controller.connects(), 1);

    let labels: Vec<_> = recorder.values().into_iter().map(|(l, _)| l).collect();
    let expected: Vec<_> = epever_catalog().unwrap().labels().collect();
    assert_eq!(labels, expected);

    assert_eq!(recorder.value("Solar Voltage"), Some(MetricValue::Gauge(18.34)));
    assert_eq!(recorder.value("Solar Power"), Some(MetricValue::Gauge(45.85)));
    assert_eq!(
        recorder.value("Battery State of Charge"),
        Some(MetricValue::Counter(87))
    );
    assert_eq!(
        recorder.value("Battery Temperature"),
        Some(MetricValue::Gauge(-1.5))
    );
    assert_eq!(recorder.value("Is Night"), Some(MetricValue::Boolean(true)));
    assert_eq!(recorder.value("Is Day"), Some(MetricValue::Boolean(false)));
    assert_eq!(recorder.value("Battery Type"), Some(MetricValue::from("FLOODED")));
    assert_eq!(
        recorder.value("Battery Rated Voltage"),
        Some(MetricValue::from("AUTO"))
    );
    assert_eq!(
        recorder.value("Float Charging Voltage"),
        Some(MetricValue::Gauge(13.5))
    );

    let status = recorder.value("Charging Equipment Status").unwrap();
    assert_eq!(
        status.field("charging_status"),
        Some(&MetricValue::from("BOOST"))
    );

    let block = recorder.value("Battery Voltage Control Registers").unwrap();
    assert_eq!(
        block.field("float_charging_voltage"),
        recorder.value("Float Charging Voltage").as_ref()
    );

    assert_eq!(
        recorder.value("Real Time Clock (RTC)").unwrap().to_string(),
        "2025-02-03 08:30:15"
    );
}

#[tokio::test(start_paused = true)]
async fn test_exception_restarts_pass() {
    let mut registers = RegisterFile::typical();
    registers.faulty.insert(0x9000);
    let controller = SimulatedController::new(registers);
    let mut recorder = Recorder::default();

    let start = tokio::time::Instant::now();
    let exit = assert_ok!(supervisor(controller.clone(), &[]).run(&mut recorder).await);

    assert_eq!(exit.reconnects, 1);
    assert_eq!(controller.connects(), 2);
    assert!(start.elapsed() >= Duration::from_secs(5));

    let failed = recorder.events.iter().find_map(|event| match event {
        PollEvent::ReadFailed { label, error } => Some((*label, error.clone())),
        _ => None,
    });
    assert_eq!(
        failed,
        Some((
            "Battery Type",
            LinkError::Exception("IllegalDataAddress".to_string())
        ))
    );

    // 24 readings before the failure, then one complete pass.
    assert_eq!(recorder.values().len(), 24 + 58);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_metrics_are_unavailable() {
    let controller = SimulatedController::new(RegisterFile::typical());
    let mut recorder = Recorder::default();

    let exit = supervisor(controller, &["Real Time Clock (RTC)", "Battery Type"])
        .run(&mut recorder)
        .await;
    assert_ok!(exit);

    let unavailable: Vec<_> = recorder
        .events
        .iter()
        .filter_map(|event| match event {
            PollEvent::Unavailable { label } => Some(*label),
            _ => None,
        })
        .collect();
    assert_eq!(unavailable, vec!["Battery Type", "Real Time Clock (RTC)"]);
    assert_eq!(recorder.values().len(), 56);
    assert!(recorder.events.contains(&PollEvent::PassCompleted {
        readings: 56,
        skipped: 2
    }));
}

#[tokio::test(start_paused = true)]
async fn test_missing_port_never_connects() {
    let controller = SimulatedController::new(RegisterFile::typical());
    let catalog = epever_catalog().unwrap();
    let supervisor = ConnectionSupervisor::new(
        params(),
        controller.clone(),
        Ports(vec!["/dev/ttyS0".to_string()]),
        PollExecutor::new(catalog),
        PollingConfig::default(),
    );

    let mut recorder = Recorder::default();
    let err = assert_err!(supervisor.run(&mut recorder).await);

    assert_eq!(
        err.to_string(),
        "Port /dev/ttyUSB0 is not available. Available ports: /dev/ttyS0"
    );
    assert_eq!(controller.connects(), 0);
}

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            // EPEVER Tracer 3210AN on the first USB adapter
            connection: { port: "/dev/ttyUSB0", read_timeout_ms: 500 },
            polling: { poll_interval_secs: 30 },
            disabled_metrics: ["Remote Battery Temperature"],
        }"#,
    )
    .unwrap();

    let config = assert_ok!(EpeverConfig::load(file.path()));
    assert_eq!(config.connection.read_timeout(), Duration::from_millis(500));
    assert_eq!(config.polling.poll_interval(), Duration::from_secs(30));
    assert_eq!(config.connection_parameters().unwrap(), params());
}

#[test]
fn test_load_rejects_unknown_metric() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ disabled_metrics: ["Solar Voltag"] }"#)
        .unwrap();

    assert_err!(EpeverConfig::load(file.path()));
}
