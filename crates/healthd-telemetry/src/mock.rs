//! Mock attribute sources for testing without real hardware
//!
//! [`MockAttributes`] is an in-memory [`AttributeReader`] whose contents can be
//! changed from tests while samplers hold a clone. [`MockBattery`] describes a
//! healthy battery and can populate either a `MockAttributes` or a directory
//! tree on disk.
//!
//! # Usage
//!
//! ```no_run
//! use healthd_telemetry::mock::{MockAttributes, MockBattery};
//! use healthd_telemetry::{BatteryConfig, BatterySampler};
//!
//! let attrs = MockAttributes::new();
//! let config = BatteryConfig::default();
//! MockBattery::default().install(&attrs, &config);
//!
//! let sampler = BatterySampler::new(config, attrs.clone());
//! assert_eq!(sampler.capacity().unwrap(), 85);
//! ```

use crate::attribute::{Attribute, AttributeReader};
use crate::config::BatteryConfig;
use crate::decode;
use crate::error::AttributeError;
use crate::power::{BatteryHealth, BatterySnapshot, BatteryStatus};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory attribute files keyed by full path
#[derive(Debug, Clone, Default)]
pub struct MockAttributes {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MockAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn set(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), contents.into());
        }
    }

    /// Delete a file
    pub fn remove(&self, path: impl AsRef<Path>) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path.as_ref());
        }
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(path.as_ref()))
            .unwrap_or(false)
    }
}

impl AttributeReader for MockAttributes {
    fn read_file(&self, path: &Path) -> Result<String, AttributeError> {
        let contents = self
            .files
            .read()
            .ok()
            .and_then(|files| files.get(path).cloned());

        contents.ok_or_else(|| AttributeError::Read {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }
}

/// Attribute values of a simulated battery, as the kernel would write them
#[derive(Debug, Clone)]
pub struct MockBattery {
    pub technology: String,
    pub capacity: i32,
    pub current_max: i32,
    pub current_now: i32,
    pub current_avg: Option<i32>,
    pub voltage_max: i32,
    pub voltage_now: i32,
    pub temp: i32,
    pub cycle_count: i32,
    pub charge_full: i32,
    pub charge_counter: i32,
    pub ac_online: bool,
    pub usb_online: bool,
    pub status: String,
    pub health: String,
}

impl Default for MockBattery {
    fn default() -> Self {
        Self {
            technology: "Li-ion".into(),
            capacity: 85,
            current_max: 500000,
            current_now: -500000,
            current_avg: Some(-480000),
            voltage_max: 4200000,
            voltage_now: 3700000,
            temp: 250,
            cycle_count: 42,
            charge_full: 3500000,
            charge_counter: 2975000,
            ac_online: false,
            usb_online: true,
            status: "Discharging".into(),
            health: "Good".into(),
        }
    }
}

impl MockBattery {
    /// A battery on the charger
    pub fn charging() -> Self {
        Self {
            current_now: 1000000,
            current_avg: Some(950000),
            ac_online: true,
            status: "Charging".into(),
            ..Default::default()
        }
    }

    /// Every attribute file with its full path and content
    pub fn files(&self, config: &BatteryConfig) -> Vec<(PathBuf, String)> {
        let battery = config.battery_dir();
        let online = |flag: bool| (if flag { "1\n" } else { "0\n" }).to_string();

        let mut files = vec![
            (Attribute::Technology, format!("{}\n", self.technology)),
            (Attribute::Capacity, format!("{}\n", self.capacity)),
            (Attribute::CurrentMax, format!("{}\n", self.current_max)),
            (Attribute::CurrentNow, format!("{}\n", self.current_now)),
            (Attribute::VoltageMax, format!("{}\n", self.voltage_max)),
            (Attribute::VoltageNow, format!("{}\n", self.voltage_now)),
            (Attribute::Temp, format!("{}\n", self.temp)),
            (Attribute::CycleCount, format!("{}\n", self.cycle_count)),
            (Attribute::ChargeFull, format!("{}\n", self.charge_full)),
            (Attribute::ChargeCounter, format!("{}\n", self.charge_counter)),
            (Attribute::Status, format!("{}\n", self.status)),
            (Attribute::Health, format!("{}\n", self.health)),
        ]
        .into_iter()
        .map(|(attribute, contents)| (battery.join(attribute.file_name()), contents))
        .collect::<Vec<_>>();

        if let Some(current_avg) = self.current_avg {
            files.push((
                battery.join(Attribute::CurrentAvg.file_name()),
                format!("{}\n", current_avg),
            ));
        }

        files.push((
            config.ac_charger_dir().join(Attribute::AcOnline.file_name()),
            online(self.ac_online),
        ));
        files.push((
            config.usb_charger_dir().join(Attribute::UsbOnline.file_name()),
            online(self.usb_online),
        ));

        files
    }

    /// Populate an in-memory attribute set
    pub fn install(&self, attrs: &MockAttributes, config: &BatteryConfig) {
        for (path, contents) in self.files(config) {
            attrs.set(path, contents);
        }
    }

    /// Write the attribute files to disk, creating directories as needed
    pub fn write_to(&self, config: &BatteryConfig) -> io::Result<()> {
        for (path, contents) in self.files(config) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, contents)?;
        }
        Ok(())
    }

    /// The snapshot a sampler is expected to produce from these attributes
    pub fn snapshot(&self) -> BatterySnapshot {
        BatterySnapshot {
            present: true,
            technology: self.technology.clone(),
            level_percent: self.capacity,
            max_charging_current_microamps: self.current_max,
            max_charging_voltage_microvolts: self.voltage_max,
            current_microamps: self.current_now,
            current_average_microamps: self.current_avg,
            voltage_millivolts: decode::microvolts_to_millivolts(self.voltage_now),
            temperature_tenths_celsius: self.temp,
            cycle_count: self.cycle_count,
            full_charge_uah: self.charge_full,
            charge_counter_uah: self.charge_counter,
            charger_ac_online: self.ac_online,
            charger_usb_online: self.usb_online,
            charger_wireless_online: false,
            status: BatteryStatus::from_label(&format!("{}\n", self.status)),
            health: BatteryHealth::from_label(&format!("{}\n", self.health)),
        }
    }
}
