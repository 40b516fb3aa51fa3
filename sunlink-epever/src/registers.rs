//! EPEVER Tracer register map and value decoding.
//!
//! Live data sits in input registers (0x3000 block), settings in holding
//! registers (0x9000 block) and flags in discrete inputs (0x2000 block).
//! 32-bit values span two registers, low word first. Most values are
//! fixed-point with two decimals.

use chrono::NaiveDate;
use sunlink_common::MetricValue;
use sunlink_framework::LinkError;

/// Modbus register types used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterType {
    /// Discrete input contacts (read-only, 1-bit)
    Discrete,
    /// Input registers (read-only, 16-bit)
    Input,
    /// Holding registers (read/write, 16-bit)
    Holding,
}

impl RegisterType {
    /// Return the string name for this register type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegisterType::Discrete => "discrete",
            RegisterType::Input => "input",
            RegisterType::Holding => "holding",
        }
    }
}

/// How the raw response of a register is turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Unsigned 16-bit, two decimals.
    Centi,
    /// Signed 16-bit, two decimals.
    SignedCenti,
    /// Unsigned 32-bit (low word first), two decimals.
    LongCenti,
    /// Signed 32-bit (low word first), two decimals.
    SignedLongCenti,
    /// Unsigned 16-bit as is.
    Raw,
    /// Discrete input.
    Bit,
    /// Discrete input, negated.
    InvertedBit,
    /// Code looked up in a name table.
    Enumerated(&'static [&'static str]),
    /// Battery status bitfield (0x3200).
    BatteryStatus,
    /// Charging equipment status bitfield (0x3201).
    ChargingStatus,
    /// Discharging equipment status bitfield (0x3202).
    DischargingStatus,
    /// The twelve battery voltage setpoints (0x9003..=0x900E).
    VoltageControlBlock,
    /// Packed real time clock (0x9013..=0x9015).
    Clock,
}

impl Encoding {
    /// Number of registers (or bits) to request.
    pub fn count(&self) -> u16 {
        match self {
            Encoding::LongCenti | Encoding::SignedLongCenti => 2,
            Encoding::VoltageControlBlock => 12,
            Encoding::Clock => 3,
            _ => 1,
        }
    }
}

/// Location and encoding of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub register_type: RegisterType,
    pub address: u16,
    pub encoding: Encoding,
}

impl Register {
    const fn new(register_type: RegisterType, address: u16, encoding: Encoding) -> Self {
        Self {
            register_type,
            address,
            encoding,
        }
    }

    pub fn count(&self) -> u16 {
        self.encoding.count()
    }
}

/// Raw data returned by the device for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Bits(Vec<bool>),
    Words(Vec<u16>),
}

pub const BATTERY_TYPES: &[&str] = &["USER_DEFINED", "SEALED", "GEL", "FLOODED"];

pub const BATTERY_RATED_VOLTAGES: &[&str] = &[
    "AUTO", "12V", "24V", "36V", "48V", "60V", "110V", "120V", "220V", "240V",
];

pub const LOAD_MANUAL_DEFAULTS: &[&str] = &["OFF", "ON"];

pub const CHARGING_MODES: &[&str] = &["VOLTAGE_COMPENSATION", "SOC"];

const BATTERY_STATES: &[&str] = &[
    "NORMAL",
    "OVER_VOLTAGE",
    "UNDER_VOLTAGE",
    "LOW_VOLTAGE_DISCONNECT",
    "FAULT",
];

const TEMPERATURE_WARNINGS: &[&str] = &["NORMAL", "OVER_TEMPERATURE", "LOW_TEMPERATURE"];

const CHARGING_INPUT_VOLTAGE: &[&str] = &[
    "NORMAL",
    "NO_POWER_CONNECTED",
    "HIGHER_VOLTAGE_INPUT",
    "INPUT_VOLTAGE_ERROR",
];

const CHARGING_PHASES: &[&str] = &["NO_CHARGING", "FLOAT", "BOOST", "EQUALIZATION"];

const DISCHARGING_INPUT_VOLTAGE: &[&str] = &[
    "NORMAL",
    "LOW",
    "HIGH",
    "NO_ACCESS_INPUT_VOLTAGE_ERROR",
];

const OUTPUT_POWER_LOAD: &[&str] = &["LIGHT", "MODERATE", "RATED", "OVERLOAD"];

/// Field names of the voltage control block, in register order.
pub const VOLTAGE_CONTROL_FIELDS: [&str; 12] = [
    "over_voltage_disconnect_voltage",
    "charging_limit_voltage",
    "over_voltage_reconnect_voltage",
    "equalize_charging_voltage",
    "boost_charging_voltage",
    "float_charging_voltage",
    "boost_reconnect_charging_voltage",
    "low_voltage_reconnect_voltage",
    "under_voltage_recover_voltage",
    "under_voltage_warning_voltage",
    "low_voltage_disconnect_voltage",
    "discharging_limit_voltage",
];

/// Every value the controller driver can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reading {
    SolarVoltage,
    SolarCurrent,
    SolarPower,
    LoadVoltage,
    LoadCurrent,
    LoadPower,
    BatteryCurrent,
    BatteryVoltage,
    BatteryPower,
    BatteryStateOfCharge,
    BatteryTemperature,
    RemoteBatteryTemperature,
    ControllerTemperature,
    BatteryStatus,
    ChargingEquipmentStatus,
    DischargingEquipmentStatus,
    IsDay,
    IsNight,
    IsDeviceOverTemperature,
    MaximumBatteryVoltageToday,
    MinimumBatteryVoltageToday,
    RatedChargingCurrent,
    RatedLoadCurrent,
    BatteryRealRatedVoltage,
    BatteryType,
    BatteryCapacity,
    TemperatureCompensationCoefficient,
    BatteryVoltageControlRegisters,
    OverVoltageDisconnectVoltage,
    ChargingLimitVoltage,
    OverVoltageReconnectVoltage,
    EqualizeChargingVoltage,
    BoostChargingVoltage,
    FloatChargingVoltage,
    BoostReconnectChargingVoltage,
    LowVoltageReconnectVoltage,
    UnderVoltageRecoverVoltage,
    UnderVoltageWarningVoltage,
    LowVoltageDisconnectVoltage,
    DischargingLimitVoltage,
    BatteryRatedVoltage,
    DefaultLoadOnOffInManualMode,
    EqualizeDuration,
    BoostDuration,
    BatteryDischarge,
    BatteryCharge,
    ChargingMode,
    TotalConsumedEnergy,
    TotalGeneratedEnergy,
    MaximumPvVoltageToday,
    MinimumPvVoltageToday,
    ConsumedEnergyToday,
    ConsumedEnergyThisMonth,
    ConsumedEnergyThisYear,
    GeneratedEnergyToday,
    GeneratedEnergyThisMonth,
    GeneratedEnergyThisYear,
    RealTimeClock,
}

impl Reading {
    /// Where this reading lives and how it is encoded.
    pub fn register(self) -> Register {
        use Encoding::*;
        use RegisterType::{Discrete, Holding, Input};

        match self {
            Reading::SolarVoltage => Register::new(Input, 0x3100, Centi),
            Reading::SolarCurrent => Register::new(Input, 0x3101, Centi),
            Reading::SolarPower => Register::new(Input, 0x3102, LongCenti),
            Reading::BatteryPower => Register::new(Input, 0x3106, LongCenti),
            Reading::LoadVoltage => Register::new(Input, 0x310C, Centi),
            Reading::LoadCurrent => Register::new(Input, 0x310D, Centi),
            Reading::LoadPower => Register::new(Input, 0x310E, LongCenti),
            Reading::BatteryTemperature => Register::new(Input, 0x3110, SignedCenti),
            Reading::ControllerTemperature => Register::new(Input, 0x3111, SignedCenti),
            Reading::BatteryStateOfCharge => Register::new(Input, 0x311A, Raw),
            Reading::RemoteBatteryTemperature => Register::new(Input, 0x311B, SignedCenti),
            Reading::BatteryRealRatedVoltage => Register::new(Input, 0x311D, Centi),
            Reading::BatteryStatus => Register::new(Input, 0x3200, BatteryStatus),
            Reading::ChargingEquipmentStatus => Register::new(Input, 0x3201, ChargingStatus),
            Reading::DischargingEquipmentStatus => {
                Register::new(Input, 0x3202, DischargingStatus)
            }
            Reading::MaximumPvVoltageToday => Register::new(Input, 0x3300, Centi),
            Reading::MinimumPvVoltageToday => Register::new(Input, 0x3301, Centi),
            Reading::MaximumBatteryVoltageToday => Register::new(Input, 0x3302, Centi),
            Reading::MinimumBatteryVoltageToday => Register::new(Input, 0x3303, Centi),
            Reading::ConsumedEnergyToday => Register::new(Input, 0x3304, LongCenti),
            Reading::ConsumedEnergyThisMonth => Register::new(Input, 0x3306, LongCenti),
            Reading::ConsumedEnergyThisYear => Register::new(Input, 0x3308, LongCenti),
            Reading::TotalConsumedEnergy => Register::new(Input, 0x330A, LongCenti),
            Reading::GeneratedEnergyToday => Register::new(Input, 0x330C, LongCenti),
            Reading::GeneratedEnergyThisMonth => Register::new(Input, 0x330E, LongCenti),
            Reading::GeneratedEnergyThisYear => Register::new(Input, 0x3310, LongCenti),
            Reading::TotalGeneratedEnergy => Register::new(Input, 0x3312, LongCenti),
            Reading::BatteryVoltage => Register::new(Input, 0x331A, Centi),
            Reading::BatteryCurrent => Register::new(Input, 0x331B, SignedLongCenti),
            Reading::RatedChargingCurrent => Register::new(Input, 0x3005, Centi),
            Reading::RatedLoadCurrent => Register::new(Input, 0x300E, Centi),
            Reading::IsDeviceOverTemperature => Register::new(Discrete, 0x2000, Bit),
            Reading::IsNight => Register::new(Discrete, 0x200C, Bit),
            Reading::IsDay => Register::new(Discrete, 0x200C, InvertedBit),
            Reading::BatteryType => Register::new(Holding, 0x9000, Enumerated(BATTERY_TYPES)),
            Reading::BatteryCapacity => Register::new(Holding, 0x9001, Raw),
            Reading::TemperatureCompensationCoefficient => Register::new(Holding, 0x9002, Centi),
            Reading::BatteryVoltageControlRegisters => {
                Register::new(Holding, 0x9003, VoltageControlBlock)
            }
            Reading::OverVoltageDisconnectVoltage => Register::new(Holding, 0x9003, Centi),
            Reading::ChargingLimitVoltage => Register::new(Holding, 0x9004, Centi),
            Reading::OverVoltageReconnectVoltage => Register::new(Holding, 0x9005, Centi),
            Reading::EqualizeChargingVoltage => Register::new(Holding, 0x9006, Centi),
            Reading::BoostChargingVoltage => Register::new(Holding, 0x9007, Centi),
            Reading::FloatChargingVoltage => Register::new(Holding, 0x9008, Centi),
            Reading::BoostReconnectChargingVoltage => Register::new(Holding, 0x9009, Centi),
            Reading::LowVoltageReconnectVoltage => Register::new(Holding, 0x900A, Centi),
            Reading::UnderVoltageRecoverVoltage => Register::new(Holding, 0x900B, Centi),
            Reading::UnderVoltageWarningVoltage => Register::new(Holding, 0x900C, Centi),
            Reading::LowVoltageDisconnectVoltage => Register::new(Holding, 0x900D, Centi),
            Reading::DischargingLimitVoltage => Register::new(Holding, 0x900E, Centi),
            Reading::RealTimeClock => Register::new(Holding, 0x9013, Clock),
            Reading::BatteryRatedVoltage => {
                Register::new(Holding, 0x9067, Enumerated(BATTERY_RATED_VOLTAGES))
            }
            Reading::DefaultLoadOnOffInManualMode => {
                Register::new(Holding, 0x906A, Enumerated(LOAD_MANUAL_DEFAULTS))
            }
            Reading::EqualizeDuration => Register::new(Holding, 0x906B, Raw),
            Reading::BoostDuration => Register::new(Holding, 0x906C, Raw),
            Reading::BatteryDischarge => Register::new(Holding, 0x906D, Raw),
            Reading::BatteryCharge => Register::new(Holding, 0x906E, Raw),
            Reading::ChargingMode => Register::new(Holding, 0x9070, Enumerated(CHARGING_MODES)),
        }
    }

    /// Decode the device's response to this reading's request.
    pub fn decode(self, response: &Response) -> Result<MetricValue, LinkError> {
        decode(self.register().encoding, response)
    }
}

fn decode(encoding: Encoding, response: &Response) -> Result<MetricValue, LinkError> {
    match (encoding, response) {
        (Encoding::Bit, Response::Bits(bits)) => first_bit(bits).map(MetricValue::Boolean),
        (Encoding::InvertedBit, Response::Bits(bits)) => {
            first_bit(bits).map(|b| MetricValue::Boolean(!b))
        }
        (Encoding::Bit | Encoding::InvertedBit, Response::Words(_)) => Err(LinkError::Decode(
            "expected discrete inputs, got registers".to_string(),
        )),
        (_, Response::Bits(_)) => Err(LinkError::Decode(
            "expected registers, got discrete inputs".to_string(),
        )),
        (encoding, Response::Words(words)) => {
            let needed = usize::from(encoding.count());
            if words.len() < needed {
                return Err(LinkError::Decode(format!(
                    "expected {} registers, got {}",
                    needed,
                    words.len()
                )));
            }
            decode_words(encoding, words)
        }
    }
}

fn first_bit(bits: &[bool]) -> Result<bool, LinkError> {
    bits.first()
        .copied()
        .ok_or_else(|| LinkError::Decode("empty discrete input response".to_string()))
}

fn centi(raw: u16) -> f64 {
    f64::from(raw) / 100.0
}

fn long(words: &[u16]) -> u32 {
    (u32::from(words[1]) << 16) | u32::from(words[0])
}

fn flag(word: u16, bit: u8) -> bool {
    word & (1 << bit) != 0
}

fn lookup(table: &[&str], code: u16) -> MetricValue {
    match table.get(usize::from(code)) {
        Some(name) => MetricValue::from(*name),
        None => MetricValue::Text(format!("UNKNOWN({})", code)),
    }
}

/// `words` is known to hold at least `encoding.count()` registers.
fn decode_words(encoding: Encoding, words: &[u16]) -> Result<MetricValue, LinkError> {
    let value = match encoding {
        Encoding::Centi => MetricValue::Gauge(centi(words[0])),
        Encoding::SignedCenti => MetricValue::Gauge(f64::from(words[0] as i16) / 100.0),
        Encoding::LongCenti => MetricValue::Gauge(f64::from(long(words)) / 100.0),
        Encoding::SignedLongCenti => MetricValue::Gauge(f64::from(long(words) as i32) / 100.0),
        Encoding::Raw => MetricValue::from(words[0]),
        Encoding::Enumerated(table) => lookup(table, words[0]),
        Encoding::BatteryStatus => battery_status(words[0]),
        Encoding::ChargingStatus => charging_status(words[0]),
        Encoding::DischargingStatus => discharging_status(words[0]),
        Encoding::VoltageControlBlock => MetricValue::fields(
            VOLTAGE_CONTROL_FIELDS
                .iter()
                .zip(words)
                .map(|(name, raw)| (*name, MetricValue::Gauge(centi(*raw)))),
        ),
        Encoding::Clock => clock(words)?,
        Encoding::Bit | Encoding::InvertedBit => {
            return Err(LinkError::Decode(
                "expected discrete inputs, got registers".to_string(),
            ));
        }
    };
    Ok(value)
}

fn battery_status(word: u16) -> MetricValue {
    MetricValue::fields([
        ("wrong_identification_for_rated_voltage", MetricValue::from(flag(word, 15))),
        ("battery_inner_resistance_abnormal", MetricValue::from(flag(word, 8))),
        (
            "temperature_warning_status",
            lookup(TEMPERATURE_WARNINGS, (word >> 4) & 0xF),
        ),
        ("battery_status", lookup(BATTERY_STATES, word & 0xF)),
    ])
}

fn charging_status(word: u16) -> MetricValue {
    MetricValue::fields([
        (
            "input_voltage_status",
            lookup(CHARGING_INPUT_VOLTAGE, (word >> 14) & 0b11),
        ),
        ("charging_mosfet_is_short_circuit", MetricValue::from(flag(word, 13))),
        (
            "charging_or_anti_reverse_mosfet_is_open_circuit",
            MetricValue::from(flag(word, 12)),
        ),
        ("anti_reverse_mosfet_is_short_circuit", MetricValue::from(flag(word, 11))),
        ("input_over_current", MetricValue::from(flag(word, 10))),
        ("load_over_current", MetricValue::from(flag(word, 9))),
        ("load_short_circuit", MetricValue::from(flag(word, 8))),
        ("load_mosfet_short_circuit", MetricValue::from(flag(word, 7))),
        ("disequilibrium_in_three_circuits", MetricValue::from(flag(word, 6))),
        ("pv_input_short_circuit", MetricValue::from(flag(word, 4))),
        ("charging_status", lookup(CHARGING_PHASES, (word >> 2) & 0b11)),
        ("fault", MetricValue::from(flag(word, 1))),
        ("running", MetricValue::from(flag(word, 0))),
    ])
}

fn discharging_status(word: u16) -> MetricValue {
    MetricValue::fields([
        (
            "input_voltage_status",
            lookup(DISCHARGING_INPUT_VOLTAGE, (word >> 14) & 0b11),
        ),
        ("output_power_load", lookup(OUTPUT_POWER_LOAD, (word >> 12) & 0b11)),
        ("short_circuit", MetricValue::from(flag(word, 11))),
        ("unable_to_discharge", MetricValue::from(flag(word, 10))),
        ("unable_to_stop_discharging", MetricValue::from(flag(word, 9))),
        ("output_voltage_abnormal", MetricValue::from(flag(word, 8))),
        ("input_over_voltage", MetricValue::from(flag(word, 7))),
        ("short_circuit_in_high_voltage_side", MetricValue::from(flag(word, 6))),
        ("boost_over_voltage", MetricValue::from(flag(word, 5))),
        ("output_over_voltage", MetricValue::from(flag(word, 4))),
        ("fault", MetricValue::from(flag(word, 1))),
        ("running", MetricValue::from(flag(word, 0))),
    ])
}

/// Registers pack (second, minute), (hour, day), (month, year - 2000), low byte first.
fn clock(words: &[u16]) -> Result<MetricValue, LinkError> {
    let [second, minute] = split(words[0]);
    let [hour, day] = split(words[1]);
    let [month, year] = split(words[2]);

    NaiveDate::from_ymd_opt(2000 + i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| {
            date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
        })
        .map(MetricValue::DateTime)
        .ok_or_else(|| {
            LinkError::Decode(format!(
                "invalid clock registers {:04x} {:04x} {:04x}",
                words[0], words[1], words[2]
            ))
        })
}

fn split(word: u16) -> [u8; 2] {
    word.to_le_bytes()
}
