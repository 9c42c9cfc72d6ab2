//! Reporting facade
//!
//! [`HealthService`] is what the outer reporting layer talks to. Polls update
//! the shared [`SnapshotStore`]; on-demand queries sample fresh and turn any
//! [`SampleError`](crate::SampleError) into [`Unsupported`] instead of
//! inventing values.

use crate::attribute::AttributeReader;
use crate::config::TelemetryConfig;
use crate::disk::{DiskSampler, DiskStatsSnapshot};
use crate::error::Unsupported;
use crate::power::{BatterySampler, BatterySnapshot, BatteryStatus};
use crate::store::SnapshotStore;
use std::sync::Arc;

/// Outcome of one polling cycle
#[derive(Debug)]
pub struct PollReport {
    pub battery: crate::Result<Arc<BatterySnapshot>>,
    pub disk: crate::Result<Arc<DiskStatsSnapshot>>,
}

impl PollReport {
    pub fn is_complete(&self) -> bool {
        self.battery.is_ok() && self.disk.is_ok()
    }

    /// True when neither kind of telemetry could be sampled
    pub fn is_total_failure(&self) -> bool {
        self.battery.is_err() && self.disk.is_err()
    }
}

pub struct HealthService<R> {
    battery: BatterySampler<R>,
    disk: DiskSampler<R>,
    store: Arc<SnapshotStore>,
}

impl<R: AttributeReader + Clone> HealthService<R> {
    pub fn new(config: TelemetryConfig, reader: R, store: Arc<SnapshotStore>) -> Self {
        Self {
            battery: BatterySampler::new(config.battery, reader.clone()),
            disk: DiskSampler::new(config.disk, reader),
            store,
        }
    }
}

impl<R: AttributeReader> HealthService<R> {
    /// Sample battery and disk, publishing whatever succeeded
    pub fn poll(&self) -> PollReport {
        let battery = self
            .battery
            .sample()
            .map(|snapshot| self.store.publish_battery(snapshot));
        let disk = self
            .disk
            .sample()
            .map(|snapshot| self.store.publish_disk(snapshot));

        PollReport { battery, disk }
    }

    /// Fresh battery snapshot
    pub fn health_info(&self) -> Result<BatterySnapshot, Unsupported> {
        unsupported("health_info", self.battery.sample())
    }

    /// Statistics for every monitored disk (only the boot device)
    pub fn disk_stats(&self) -> Result<Vec<DiskStatsSnapshot>, Unsupported> {
        unsupported("disk_stats", self.disk.sample()).map(|snapshot| vec![snapshot])
    }

    pub fn charge_counter_uah(&self) -> Result<i32, Unsupported> {
        unsupported("charge_counter", self.battery.charge_counter())
    }

    pub fn current_now_microamps(&self) -> Result<i32, Unsupported> {
        unsupported("current_now", self.battery.current_now())
    }

    pub fn current_average_microamps(&self) -> Result<i32, Unsupported> {
        unsupported("current_average", self.battery.current_average())
    }

    pub fn capacity(&self) -> Result<i32, Unsupported> {
        unsupported("capacity", self.battery.capacity())
    }

    pub fn charge_status(&self) -> Result<BatteryStatus, Unsupported> {
        unsupported("charge_status", self.battery.status())
    }

    /// Battery snapshot from the last successful poll
    pub fn latest_battery(&self) -> Option<Arc<BatterySnapshot>> {
        self.store.battery()
    }

    /// Disk snapshot from the last successful poll
    pub fn latest_disk(&self) -> Option<Arc<DiskStatsSnapshot>> {
        self.store.disk()
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }
}

fn unsupported<T>(
    operation: &'static str,
    result: crate::Result<T>,
) -> Result<T, Unsupported> {
    result.map_err(|err| {
        tracing::warn!("{} unavailable: {}", operation, err);
        Unsupported { operation }
    })
}
