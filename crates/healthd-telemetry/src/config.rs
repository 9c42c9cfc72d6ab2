//! Sampler configuration
//!
//! All paths and device names are fixed per device. They are carried in plain
//! structs so tests can point the samplers at a temporary directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root of the power supply class directory
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Root of the block device class directory
pub const BLOCK_ROOT: &str = "/sys/block";

/// Where the battery and charger attributes live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub power_supply_root: PathBuf,
    pub battery: String,
    pub ac_charger: String,
    pub usb_charger: String,
}

impl BatteryConfig {
    /// Directory holding the battery attributes
    pub fn battery_dir(&self) -> PathBuf {
        self.power_supply_root.join(&self.battery)
    }

    pub fn ac_charger_dir(&self) -> PathBuf {
        self.power_supply_root.join(&self.ac_charger)
    }

    pub fn usb_charger_dir(&self) -> PathBuf {
        self.power_supply_root.join(&self.usb_charger)
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            power_supply_root: PathBuf::from(POWER_SUPPLY_ROOT),
            battery: "dummy-battery".into(),
            ac_charger: "dummy-charger-ac".into(),
            usb_charger: "dummy-charger-usb_c".into(),
        }
    }
}

/// Physical medium the system boots from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootDevice {
    /// microSD card slot
    MicroSd,
    /// Soldered eMMC
    Emmc,
}

impl BootDevice {
    /// Kernel block device name
    pub fn name(&self) -> &'static str {
        match self {
            BootDevice::MicroSd => "mmcblk0",
            BootDevice::Emmc => "mmcblk1",
        }
    }

    /// Parse from a config or command line value
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "microsd" | "sd" | "mmcblk0" => Some(BootDevice::MicroSd),
            "emmc" | "mmcblk1" => Some(BootDevice::Emmc),
            _ => None,
        }
    }

    /// Soldered storage is internal, a card in the slot is not
    pub fn is_internal(&self) -> bool {
        matches!(self, BootDevice::Emmc)
    }
}

impl Default for BootDevice {
    fn default() -> Self {
        if cfg!(feature = "emmc") {
            BootDevice::Emmc
        } else {
            BootDevice::MicroSd
        }
    }
}

/// The single monitored disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub block_root: PathBuf,
    pub device: BootDevice,
    /// Overrides the internal flag implied by `device`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_internal: Option<bool>,
    pub is_boot_device: bool,
}

impl DiskConfig {
    pub fn is_internal(&self) -> bool {
        self.is_internal.unwrap_or_else(|| self.device.is_internal())
    }

    /// Path of the block layer statistics file
    pub fn stats_path(&self) -> PathBuf {
        self.block_root.join(self.device.name()).join("stat")
    }
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            block_root: PathBuf::from(BLOCK_ROOT),
            device: BootDevice::default(),
            is_internal: None,
            is_boot_device: true,
        }
    }
}

/// Complete sampler configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub battery: BatteryConfig,

    #[serde(default)]
    pub disk: DiskConfig,
}

impl TelemetryConfig {
    /// Configuration rooted at `root` instead of `/sys`, for fixtures
    pub fn rooted_at(root: &std::path::Path) -> Self {
        Self {
            battery: BatteryConfig {
                power_supply_root: root.join("class/power_supply"),
                ..Default::default()
            },
            disk: DiskConfig {
                block_root: root.join("block"),
                ..Default::default()
            },
        }
    }
}
