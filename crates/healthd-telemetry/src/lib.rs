//! Battery and boot-disk telemetry
//!
//! Samples the battery, its chargers and the boot device's block statistics
//! from sysfs attribute files, and normalizes them into typed snapshots for a
//! reporting layer.
//!
//! # Example
//!
//! ```no_run
//! use healthd_telemetry::{HealthService, SnapshotStore, SysfsReader, TelemetryConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SnapshotStore::new());
//! let service = HealthService::new(TelemetryConfig::default(), SysfsReader::new(), store);
//!
//! let report = service.poll();
//! if let Ok(battery) = report.battery {
//!     println!("Battery at {}%", battery.level_percent);
//! }
//! ```

pub mod attribute;
pub mod config;
pub mod decode;
pub mod disk;
pub mod error;
pub mod mock;
pub mod power;
pub mod service;
pub mod store;

pub use attribute::{Attribute, AttributeReader, SysfsReader};
pub use config::{BatteryConfig, BootDevice, DiskConfig, TelemetryConfig};
pub use disk::{DISK_STATS_FIELDS, DiskCounters, DiskSampler, DiskStatsSnapshot};
pub use error::{AttributeError, ParseError, SampleError, Unsupported};
pub use power::{BatteryHealth, BatterySampler, BatterySnapshot, BatteryStatus};
pub use service::{HealthService, PollReport};
pub use store::SnapshotStore;

/// Telemetry Result type
pub type Result<T> = std::result::Result<T, SampleError>;
