//! Boot disk I/O statistics
//!
//! The block layer `stat` file holds one line of whitespace-separated
//! counters. Only the first [`DISK_STATS_FIELDS`] are consumed, in the order
//! the kernel documents them.

use crate::attribute::{Attribute, AttributeReader};
use crate::config::DiskConfig;
use crate::error::{ParseError, SampleError};
use serde::Serialize;

/// Number of counters in a disk statistics record
pub const DISK_STATS_FIELDS: usize = 11;

/// Block layer counters for one device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiskCounters {
    pub reads_completed: u64,
    pub reads_merged: u64,
    pub sectors_read: u64,
    pub time_reading_ms: u64,
    pub writes_completed: u64,
    pub writes_merged: u64,
    pub sectors_written: u64,
    pub time_writing_ms: u64,
    pub ios_in_progress: u64,
    pub time_io_ms: u64,
    pub weighted_time_io_ms: u64,
}

impl DiskCounters {
    pub fn from_array(values: [u64; DISK_STATS_FIELDS]) -> Self {
        let [
            reads_completed,
            reads_merged,
            sectors_read,
            time_reading_ms,
            writes_completed,
            writes_merged,
            sectors_written,
            time_writing_ms,
            ios_in_progress,
            time_io_ms,
            weighted_time_io_ms,
        ] = values;

        Self {
            reads_completed,
            reads_merged,
            sectors_read,
            time_reading_ms,
            writes_completed,
            writes_merged,
            sectors_written,
            time_writing_ms,
            ios_in_progress,
            time_io_ms,
            weighted_time_io_ms,
        }
    }

    /// Counters in kernel order
    pub fn to_array(&self) -> [u64; DISK_STATS_FIELDS] {
        [
            self.reads_completed,
            self.reads_merged,
            self.sectors_read,
            self.time_reading_ms,
            self.writes_completed,
            self.writes_merged,
            self.sectors_written,
            self.time_writing_ms,
            self.ios_in_progress,
            self.time_io_ms,
            self.weighted_time_io_ms,
        ]
    }
}

/// Decode up to eleven counters.
///
/// Missing trailing counters stay zero. A token that is not a non-negative
/// integer is an error.
pub fn decode_counters(text: &str) -> Result<DiskCounters, ParseError> {
    match decode_counters_prefix(text) {
        (_, Some(err)) => Err(err),
        (counters, None) => Ok(counters),
    }
}

/// Decode counters up to the first malformed token.
///
/// Counters before the bad token are kept and the rest stay zero; the parse
/// error, if any, is returned alongside.
pub fn decode_counters_prefix(text: &str) -> (DiskCounters, Option<ParseError>) {
    let mut values = [0u64; DISK_STATS_FIELDS];

    for (index, token) in text.split_whitespace().take(DISK_STATS_FIELDS).enumerate() {
        match token.parse::<u64>() {
            Ok(value) => values[index] = value,
            Err(_) => {
                let err = ParseError::InvalidCounter {
                    index,
                    token: token.to_string(),
                };
                return (DiskCounters::from_array(values), Some(err));
            }
        }
    }

    (DiskCounters::from_array(values), None)
}

/// One statistics record for the monitored disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskStatsSnapshot {
    pub device_name: String,
    pub is_internal: bool,
    pub is_boot_device: bool,
    pub counters: DiskCounters,
}

/// Samples the configured boot device
#[derive(Debug, Clone)]
pub struct DiskSampler<R> {
    config: DiskConfig,
    reader: R,
}

impl<R: AttributeReader> DiskSampler<R> {
    pub fn new(config: DiskConfig, reader: R) -> Self {
        Self { config, reader }
    }

    pub fn config(&self) -> &DiskConfig {
        &self.config
    }

    /// Read the stat file of the boot device.
    ///
    /// Only a failed read fails the sample. Short lines leave trailing counters
    /// at zero and a malformed token zeroes it and everything after it.
    pub fn sample(&self) -> crate::Result<DiskStatsSnapshot> {
        let path = self.config.stats_path();
        let raw = self.reader.read_file(&path).map_err(|source| {
            tracing::error!("{}: read failed: {}", path.display(), source);
            SampleError::Read {
                attribute: Attribute::BlockStat,
                source,
            }
        })?;

        let (counters, err) = decode_counters_prefix(&raw);
        if let Some(err) = err {
            tracing::warn!("{}: {}", path.display(), err);
        }

        Ok(DiskStatsSnapshot {
            device_name: self.config.device.name().to_string(),
            is_internal: self.config.is_internal(),
            is_boot_device: self.config.is_boot_device,
            counters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootDevice;
    use crate::mock::MockAttributes;

    #[test]
    fn test_decode_full_line() {
        let counters = decode_counters("1 2 3 4 5 6 7 8 9 10 11").unwrap();
        assert_eq!(counters.to_array(), [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(counters.reads_completed, 1);
        assert_eq!(counters.sectors_written, 7);
        assert_eq!(counters.weighted_time_io_ms, 11);
    }

    #[test]
    fn test_decode_short_line() {
        let counters = decode_counters("1 2 3").unwrap();
        assert_eq!(counters.to_array(), [1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_counters("").unwrap(), DiskCounters::default());
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        // Newer kernels append discard and flush counters
        let line = "    4861     1373   367990     2516    11279    14186   509736    21212        0    17124    24896      0 0 0 0 12 0\n";
        let counters = decode_counters(line).unwrap();
        assert_eq!(counters.reads_completed, 4861);
        assert_eq!(counters.weighted_time_io_ms, 24896);
    }

    #[test]
    fn test_decode_malformed_token() {
        assert_eq!(
            decode_counters("1 2 x"),
            Err(ParseError::InvalidCounter {
                index: 2,
                token: "x".into()
            })
        );
        assert!(decode_counters("1 -2 3").is_err());

        let (counters, err) = decode_counters_prefix("1 2 x 4");
        assert!(err.is_some());
        assert_eq!(counters.to_array(), [1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_counters_array_order() {
        let values = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1];
        assert_eq!(DiskCounters::from_array(values).to_array(), values);
    }

    #[test]
    fn test_disk_sample() {
        let attrs = MockAttributes::new();
        let config = DiskConfig {
            device: BootDevice::Emmc,
            ..Default::default()
        };
        attrs.set(config.stats_path(), "1 2 3 4 5 6 7 8 9\n");

        let snapshot = DiskSampler::new(config, attrs).sample().unwrap();
        assert_eq!(snapshot.device_name, "mmcblk1");
        assert!(snapshot.is_internal);
        assert!(snapshot.is_boot_device);
        assert_eq!(snapshot.counters.time_io_ms, 0);
        assert_eq!(snapshot.counters.weighted_time_io_ms, 0);
        assert_eq!(snapshot.counters.ios_in_progress, 9);
    }

    #[test]
    fn test_disk_sample_tolerates_malformed_line() {
        let attrs = MockAttributes::new();
        let config = DiskConfig {
            device: BootDevice::MicroSd,
            ..Default::default()
        };
        attrs.set(config.stats_path(), "5 6 garbage\n");

        let snapshot = DiskSampler::new(config, attrs).sample().unwrap();
        assert!(!snapshot.is_internal);
        assert_eq!(snapshot.counters.reads_completed, 5);
        assert_eq!(snapshot.counters.reads_merged, 6);
        assert_eq!(snapshot.counters.sectors_read, 0);
    }

    #[test]
    fn test_disk_sample_missing_file() {
        let sampler = DiskSampler::new(DiskConfig::default(), MockAttributes::new());
        let err = sampler.sample().unwrap_err();
        assert_eq!(err.attribute(), Attribute::BlockStat);
    }
}
