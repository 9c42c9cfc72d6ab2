//! Battery sampling
//!
//! Reads the battery and charger attributes under the power supply class
//! directory and assembles a [`BatterySnapshot`]. Sampling is fail-fast: the
//! first attribute that cannot be read or decoded aborts the whole pass.

use crate::attribute::{Attribute, AttributeReader};
use crate::config::BatteryConfig;
use crate::decode::{self, LabelTable};
use crate::error::{AttributeError, SampleError};
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Battery charging status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatteryStatus {
    Charging,
    Discharging,
    NotCharging,
    Full,
    Unknown,
}

/// Battery health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatteryHealth {
    Good,
    Overheat,
    Dead,
    OverVoltage,
    UnspecifiedFailure,
    Unknown,
}

/// Labels written to the `status` attribute
pub const STATUS_LABELS: &LabelTable<BatteryStatus> = &[
    ("Charging", BatteryStatus::Charging),
    ("Discharging", BatteryStatus::Discharging),
    ("Not-charging", BatteryStatus::NotCharging),
    ("Not charging", BatteryStatus::NotCharging),
    ("Full", BatteryStatus::Full),
];

/// Labels written to the `health` attribute
pub const HEALTH_LABELS: &LabelTable<BatteryHealth> = &[
    ("Good", BatteryHealth::Good),
    ("Overheat", BatteryHealth::Overheat),
    ("Dead", BatteryHealth::Dead),
    ("Overvoltage", BatteryHealth::OverVoltage),
    ("Over voltage", BatteryHealth::OverVoltage),
    ("Failure", BatteryHealth::UnspecifiedFailure),
    ("Unspecified failure", BatteryHealth::UnspecifiedFailure),
];

impl BatteryStatus {
    pub fn from_label(text: &str) -> Self {
        decode::decode_enum(text, STATUS_LABELS, BatteryStatus::Unknown)
    }
}

impl BatteryHealth {
    pub fn from_label(text: &str) -> Self {
        decode::decode_enum(text, HEALTH_LABELS, BatteryHealth::Unknown)
    }
}

/// One point-in-time battery reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatterySnapshot {
    pub present: bool,
    pub technology: String,
    pub level_percent: i32,
    pub max_charging_current_microamps: i32,
    pub max_charging_voltage_microvolts: i32,
    pub current_microamps: i32,
    pub current_average_microamps: Option<i32>,
    pub voltage_millivolts: i32,
    pub temperature_tenths_celsius: i32,
    pub cycle_count: i32,
    pub full_charge_uah: i32,
    pub charge_counter_uah: i32,
    pub charger_ac_online: bool,
    pub charger_usb_online: bool,
    pub charger_wireless_online: bool,
    pub status: BatteryStatus,
    pub health: BatteryHealth,
}

impl BatterySnapshot {
    /// Temperature in whole degrees Celsius
    pub fn temperature_celsius(&self) -> i32 {
        decode::tenths_to_celsius(self.temperature_tenths_celsius)
    }
}

/// Samples the configured battery and its chargers
#[derive(Debug, Clone)]
pub struct BatterySampler<R> {
    config: BatteryConfig,
    reader: R,
}

impl<R: AttributeReader> BatterySampler<R> {
    pub fn new(config: BatteryConfig, reader: R) -> Self {
        Self { config, reader }
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    /// Read and decode every battery attribute in one pass
    pub fn sample(&self) -> Result<BatterySnapshot> {
        let technology = decode::decode_text(&self.read_raw(Attribute::Technology)?);
        let level_percent = self.read_int(Attribute::Capacity)?;
        let max_charging_current_microamps = self.read_int(Attribute::CurrentMax)?;
        let current_microamps = self.read_int(Attribute::CurrentNow)?;
        let max_charging_voltage_microvolts = self.read_int(Attribute::VoltageMax)?;
        let voltage_millivolts =
            decode::microvolts_to_millivolts(self.read_int(Attribute::VoltageNow)?);
        let temperature_tenths_celsius = self.read_int(Attribute::Temp)?;
        let cycle_count = self.read_int(Attribute::CycleCount)?;
        let full_charge_uah = self.read_int(Attribute::ChargeFull)?;
        let charge_counter_uah = self.read_int(Attribute::ChargeCounter)?;
        let charger_ac_online = decode::decode_bool_nonzero(&self.read_raw(Attribute::AcOnline)?);
        let charger_usb_online =
            decode::decode_bool_nonzero(&self.read_raw(Attribute::UsbOnline)?);
        let status = BatteryStatus::from_label(&self.read_raw(Attribute::Status)?);
        let health = BatteryHealth::from_label(&self.read_raw(Attribute::Health)?);
        let current_average_microamps = self.read_optional_int(Attribute::CurrentAvg)?;

        Ok(BatterySnapshot {
            // Battery is soldered in
            present: true,
            technology,
            level_percent,
            max_charging_current_microamps,
            max_charging_voltage_microvolts,
            current_microamps,
            current_average_microamps,
            voltage_millivolts,
            temperature_tenths_celsius,
            cycle_count,
            full_charge_uah,
            charge_counter_uah,
            charger_ac_online,
            charger_usb_online,
            // No wireless charger on this board
            charger_wireless_online: false,
            status,
            health,
        })
    }

    /// Remaining charge in µAh
    pub fn charge_counter(&self) -> Result<i32> {
        self.read_int(Attribute::ChargeCounter)
    }

    /// Instantaneous current in µA
    pub fn current_now(&self) -> Result<i32> {
        self.read_int(Attribute::CurrentNow)
    }

    /// Average current in µA
    pub fn current_average(&self) -> Result<i32> {
        self.read_int(Attribute::CurrentAvg)
    }

    /// Charge level in percent
    pub fn capacity(&self) -> Result<i32> {
        self.read_int(Attribute::Capacity)
    }

    pub fn status(&self) -> Result<BatteryStatus> {
        Ok(BatteryStatus::from_label(
            &self.read_raw(Attribute::Status)?,
        ))
    }

    pub fn health(&self) -> Result<BatteryHealth> {
        Ok(BatteryHealth::from_label(
            &self.read_raw(Attribute::Health)?,
        ))
    }

    /// Full path of an attribute file
    pub fn attribute_path(&self, attribute: Attribute) -> PathBuf {
        self.attribute_dir(attribute).join(attribute.file_name())
    }

    fn attribute_dir(&self, attribute: Attribute) -> PathBuf {
        match attribute {
            Attribute::AcOnline => self.config.ac_charger_dir(),
            Attribute::UsbOnline => self.config.usb_charger_dir(),
            _ => self.config.battery_dir(),
        }
    }

    fn read_raw(&self, attribute: Attribute) -> Result<String> {
        let dir = self.attribute_dir(attribute);
        self.reader
            .read(&dir, attribute.file_name())
            .map_err(|source| read_failed(attribute, source))
    }

    fn read_int(&self, attribute: Attribute) -> Result<i32> {
        let raw = self.read_raw(attribute)?;
        self.parse_int(attribute, &raw)
    }

    fn read_optional_int(&self, attribute: Attribute) -> Result<Option<i32>> {
        let dir = self.attribute_dir(attribute);
        match self.reader.read(&dir, attribute.file_name()) {
            Ok(raw) => self.parse_int(attribute, &raw).map(Some),
            Err(err) if err.is_not_found() => {
                tracing::debug!("{} not present: {}", attribute, err);
                Ok(None)
            }
            Err(source) => Err(read_failed(attribute, source)),
        }
    }

    fn parse_int(&self, attribute: Attribute, raw: &str) -> Result<i32> {
        decode::decode_int(raw).map_err(|source| {
            tracing::error!("{}: {}", self.attribute_path(attribute).display(), source);
            SampleError::Parse { attribute, source }
        })
    }
}

fn read_failed(attribute: Attribute, source: AttributeError) -> SampleError {
    tracing::error!("{}: read failed: {}", source.path().display(), source);
    SampleError::Read { attribute, source }
}
