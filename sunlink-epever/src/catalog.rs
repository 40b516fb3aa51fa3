//! The EPEVER metric catalog.

use sunlink_framework::{CatalogError, MetricCatalog, MetricDescriptor};

use crate::registers::Reading;

/// Label and reading of every catalog entry, in reporting order.
const ENTRIES: [(&str, Reading); 58] = [
    ("Solar Voltage", Reading::SolarVoltage),
    ("Solar Current", Reading::SolarCurrent),
    ("Solar Power", Reading::SolarPower),
    ("Load Voltage", Reading::LoadVoltage),
    ("Load Current", Reading::LoadCurrent),
    ("Load Power", Reading::LoadPower),
    ("Battery Current", Reading::BatteryCurrent),
    ("Battery Voltage", Reading::BatteryVoltage),
    ("Battery Power", Reading::BatteryPower),
    ("Battery State of Charge", Reading::BatteryStateOfCharge),
    ("Battery Temperature", Reading::BatteryTemperature),
    ("Remote Battery Temperature", Reading::RemoteBatteryTemperature),
    ("Controller Temperature", Reading::ControllerTemperature),
    ("Battery Status", Reading::BatteryStatus),
    ("Charging Equipment Status", Reading::ChargingEquipmentStatus),
    ("Discharging Equipment Status", Reading::DischargingEquipmentStatus),
    ("Is Day", Reading::IsDay),
    ("Is Night", Reading::IsNight),
    ("Is Device Over Temperature", Reading::IsDeviceOverTemperature),
    ("Maximum Battery Voltage Today", Reading::MaximumBatteryVoltageToday),
    ("Minimum Battery Voltage Today", Reading::MinimumBatteryVoltageToday),
    ("Rated Charging Current", Reading::RatedChargingCurrent),
    ("Rated Load Current", Reading::RatedLoadCurrent),
    ("Battery Real Rated Voltage", Reading::BatteryRealRatedVoltage),
    ("Battery Type", Reading::BatteryType),
    ("Battery Capacity", Reading::BatteryCapacity),
    (
        "Temperature Compensation Coefficient",
        Reading::TemperatureCompensationCoefficient,
    ),
    (
        "Battery Voltage Control Registers",
        Reading::BatteryVoltageControlRegisters,
    ),
    (
        "Over Voltage Disconnect Voltage",
        Reading::OverVoltageDisconnectVoltage,
    ),
    ("Charging Limit Voltage", Reading::ChargingLimitVoltage),
    (
        "Over Voltage Reconnect Voltage",
        Reading::OverVoltageReconnectVoltage,
    ),
    ("Equalize Charging Voltage", Reading::EqualizeChargingVoltage),
    ("Boost Charging Voltage", Reading::BoostChargingVoltage),
    ("Float Charging Voltage", Reading::FloatChargingVoltage),
    (
        "Boost Reconnect Charging Voltage",
        Reading::BoostReconnectChargingVoltage,
    ),
    (
        "Low Voltage Reconnect Voltage",
        Reading::LowVoltageReconnectVoltage,
    ),
    (
        "Under Voltage Recover Voltage",
        Reading::UnderVoltageRecoverVoltage,
    ),
    (
        "Under Voltage Warning Voltage",
        Reading::UnderVoltageWarningVoltage,
    ),
    (
        "Low Voltage Disconnect Voltage",
        Reading::LowVoltageDisconnectVoltage,
    ),
    ("Discharging Limit Voltage", Reading::DischargingLimitVoltage),
    ("Battery Rated Voltage", Reading::BatteryRatedVoltage),
    (
        "Default Load On/Off in Manual Mode",
        Reading::DefaultLoadOnOffInManualMode,
    ),
    ("Equalize Duration", Reading::EqualizeDuration),
    ("Boost Duration", Reading::BoostDuration),
    ("Battery Discharge", Reading::BatteryDischarge),
    ("Battery Charge", Reading::BatteryCharge),
    ("Charging Mode", Reading::ChargingMode),
    ("Total Consumed Energy", Reading::TotalConsumedEnergy),
    ("Total Generated Energy", Reading::TotalGeneratedEnergy),
    ("Maximum PV Voltage Today", Reading::MaximumPvVoltageToday),
    ("Minimum PV Voltage Today", Reading::MinimumPvVoltageToday),
    ("Consumed Energy Today", Reading::ConsumedEnergyToday),
    ("Consumed Energy This Month", Reading::ConsumedEnergyThisMonth),
    ("Consumed Energy This Year", Reading::ConsumedEnergyThisYear),
    ("Generated Energy Today", Reading::GeneratedEnergyToday),
    ("Generated Energy This Month", Reading::GeneratedEnergyThisMonth),
    ("Generated Energy This Year", Reading::GeneratedEnergyThisYear),
    ("Real Time Clock (RTC)", Reading::RealTimeClock),
];

/// Build the full EPEVER catalog with every entry bound.
pub fn epever_catalog() -> Result<MetricCatalog<Reading>, CatalogError> {
    MetricCatalog::new(
        ENTRIES
            .into_iter()
            .map(|(label, reading)| MetricDescriptor::new(label, reading)),
    )
}

/// Whether `label` names a catalog entry.
pub fn is_known_label(label: &str) -> bool {
    ENTRIES.iter().any(|(known, _)| *known == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_builds() {
        let catalog = epever_catalog().unwrap();
        assert_eq!(catalog.len(), 58);
        assert!(catalog.iter().all(|entry| entry.op.is_some()));
    }

    #[test]
    fn test_every_reading_used_once() {
        let readings: HashSet<_> = ENTRIES.iter().map(|(_, reading)| *reading).collect();
        assert_eq!(readings.len(), ENTRIES.len());
    }

    #[test]
    fn test_known_labels() {
        assert!(is_known_label("Battery Type"));
        assert!(!is_known_label("battery type"));
    }
}
