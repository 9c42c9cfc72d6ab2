//! Latest-snapshot store
//!
//! Holds the most recent successful battery and disk snapshots for readers on
//! other threads. Snapshots are swapped in whole behind a lock, so a reader
//! never observes a half-written record.

use crate::disk::DiskStatsSnapshot;
use crate::power::BatterySnapshot;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct SnapshotStore {
    battery: RwLock<Option<Arc<BatterySnapshot>>>,
    disk: RwLock<Option<Arc<DiskStatsSnapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the battery snapshot
    pub fn publish_battery(&self, snapshot: BatterySnapshot) -> Arc<BatterySnapshot> {
        let snapshot = Arc::new(snapshot);
        *write(&self.battery) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Replace the disk snapshot
    pub fn publish_disk(&self, snapshot: DiskStatsSnapshot) -> Arc<DiskStatsSnapshot> {
        let snapshot = Arc::new(snapshot);
        *write(&self.disk) = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Last published battery snapshot
    pub fn battery(&self) -> Option<Arc<BatterySnapshot>> {
        read(&self.battery).clone()
    }

    /// Last published disk snapshot
    pub fn disk(&self) -> Option<Arc<DiskStatsSnapshot>> {
        read(&self.disk).clone()
    }
}

// A panic while holding the lock cannot leave a torn value behind (writes are
// a single pointer assignment), so poisoning is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::DiskCounters;
    use crate::mock::MockBattery;
    use std::thread;

    fn disk_snapshot(reads: u64) -> DiskStatsSnapshot {
        DiskStatsSnapshot {
            device_name: "mmcblk0".into(),
            is_internal: true,
            is_boot_device: true,
            counters: DiskCounters {
                reads_completed: reads,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.battery().is_none());
        assert!(store.disk().is_none());
    }

    #[test]
    fn test_publish_overwrites() {
        let store = SnapshotStore::new();
        store.publish_disk(disk_snapshot(1));
        store.publish_disk(disk_snapshot(2));
        assert_eq!(store.disk().unwrap().counters.reads_completed, 2);

        let battery = MockBattery::default().snapshot();
        store.publish_battery(battery.clone());
        assert_eq!(*store.battery().unwrap(), battery);
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let store = SnapshotStore::new();
        let first = store.publish_disk(disk_snapshot(1));
        let held = store.disk().unwrap();
        store.publish_disk(disk_snapshot(2));

        assert!(Arc::ptr_eq(&first, &held));
        assert_eq!(held.counters.reads_completed, 1);
    }

    #[test]
    fn test_concurrent_readers() {
        let store = Arc::new(SnapshotStore::new());
        store.publish_disk(disk_snapshot(0));

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 1..=100 {
                    store.publish_disk(disk_snapshot(i));
                }
            })
        };

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..100 {
                    let reads = store.disk().unwrap().counters.reads_completed;
                    assert!(reads >= last);
                    last = reads;
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(store.disk().unwrap().counters.reads_completed, 100);
    }
}
