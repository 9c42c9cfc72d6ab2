//! Attribute file access
//!
//! An attribute is one pseudo-file exposing a single sensor or state value as
//! text. Readers return the raw content and leave all parsing to `decode`.

use crate::error::AttributeError;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Largest attribute accepted (one sysfs page)
pub const MAX_ATTRIBUTE_BYTES: u64 = 4096;

/// Every attribute file the samplers consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Technology,
    Capacity,
    CurrentMax,
    CurrentNow,
    CurrentAvg,
    VoltageMax,
    VoltageNow,
    Temp,
    CycleCount,
    ChargeFull,
    ChargeCounter,
    AcOnline,
    UsbOnline,
    Status,
    Health,
    BlockStat,
}

impl Attribute {
    /// Name of the file backing this attribute
    pub fn file_name(&self) -> &'static str {
        match self {
            Attribute::Technology => "technology",
            Attribute::Capacity => "capacity",
            Attribute::CurrentMax => "current_max",
            Attribute::CurrentNow => "current_now",
            Attribute::CurrentAvg => "current_avg",
            Attribute::VoltageMax => "voltage_max",
            Attribute::VoltageNow => "voltage_now",
            Attribute::Temp => "temp",
            Attribute::CycleCount => "cycle_count",
            Attribute::ChargeFull => "charge_full",
            Attribute::ChargeCounter => "charge_counter",
            Attribute::AcOnline | Attribute::UsbOnline => "online",
            Attribute::Status => "status",
            Attribute::Health => "health",
            Attribute::BlockStat => "stat",
        }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::AcOnline => "ac_online",
            Attribute::UsbOnline => "usb_online",
            other => other.file_name(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of raw attribute text
pub trait AttributeReader {
    /// Read the whole content of the attribute file at `path`
    fn read_file(&self, path: &Path) -> Result<String, AttributeError>;

    /// Read `base/name`
    fn read(&self, base: &Path, name: &str) -> Result<String, AttributeError> {
        self.read_file(&base.join(name))
    }
}

/// Reads attributes from the real filesystem
#[derive(Debug, Clone, Copy)]
pub struct SysfsReader {
    max_bytes: u64,
}

impl SysfsReader {
    pub fn new() -> Self {
        Self {
            max_bytes: MAX_ATTRIBUTE_BYTES,
        }
    }

    /// Create a reader with a custom size bound
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Default for SysfsReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeReader for SysfsReader {
    fn read_file(&self, path: &Path) -> Result<String, AttributeError> {
        let read_err = |source| AttributeError::Read {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_err)?;

        // Take one byte past the limit so oversized files are detected
        let mut bytes = Vec::new();
        file.take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(read_err)?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(AttributeError::TooLarge {
                path: path.to_path_buf(),
                limit: self.max_bytes,
            });
        }

        String::from_utf8(bytes)
            .map_err(|err| read_err(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}
