//! Counters for resolution and restore passes
//!
//! - Counters only, monotonic
//! - Thread-safe via relaxed atomics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of operational counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Paths resolved (content track)
    paths_resolved: AtomicU64,
    /// Paths resolved to `Found`
    paths_found: AtomicU64,
    /// Paths resolved to `RemovedAt`
    paths_removed: AtomicU64,
    /// Paths resolved to `NotFound`, dangling ones included
    paths_not_found: AtomicU64,
    /// Observation runs of only `Unchanged` (any track)
    dangling_references: AtomicU64,
    /// Objects written by the restore engine
    files_restored: AtomicU64,
    /// Bytes written by the restore engine
    bytes_restored: AtomicU64,
    /// Restore passes completed
    restores_performed: AtomicU64,
    /// Restore passes aborted
    restore_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolved path by outcome
    pub fn record_resolution(&self, found: bool, removed: bool) {
        self.paths_resolved.fetch_add(1, Ordering::Relaxed);
        let counter = if found {
            &self.paths_found
        } else if removed {
            &self.paths_removed
        } else {
            &self.paths_not_found
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment dangling references
    pub fn increment_dangling(&self) {
        self.dangling_references.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one restored object
    pub fn record_file_restored(&self, bytes: u64) {
        self.files_restored.fetch_add(1, Ordering::Relaxed);
        self.bytes_restored.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Increment completed restores
    pub fn increment_restores(&self) {
        self.restores_performed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment aborted restores
    pub fn increment_restore_failures(&self) {
        self.restore_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            paths_resolved: self.paths_resolved.load(Ordering::Relaxed),
            paths_found: self.paths_found.load(Ordering::Relaxed),
            paths_removed: self.paths_removed.load(Ordering::Relaxed),
            paths_not_found: self.paths_not_found.load(Ordering::Relaxed),
            dangling_references: self.dangling_references.load(Ordering::Relaxed),
            files_restored: self.files_restored.load(Ordering::Relaxed),
            bytes_restored: self.bytes_restored.load(Ordering::Relaxed),
            restores_performed: self.restores_performed.load(Ordering::Relaxed),
            restore_failures: self.restore_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub paths_resolved: u64,
    pub paths_found: u64,
    pub paths_removed: u64,
    pub paths_not_found: u64,
    pub dangling_references: u64,
    pub files_restored: u64,
    pub bytes_restored: u64,
    pub restores_performed: u64,
    pub restore_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.paths_resolved, 0);
        assert_eq!(snapshot.files_restored, 0);
        assert_eq!(snapshot.restore_failures, 0);
    }

    #[test]
    fn test_record_resolution_buckets() {
        let registry = MetricsRegistry::new();
        registry.record_resolution(true, false);
        registry.record_resolution(false, true);
        registry.record_resolution(false, false);
        registry.record_resolution(false, false);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.paths_resolved, 4);
        assert_eq!(snapshot.paths_found, 1);
        assert_eq!(snapshot.paths_removed, 1);
        assert_eq!(snapshot.paths_not_found, 2);
    }

    #[test]
    fn test_file_counters() {
        let registry = MetricsRegistry::new();
        registry.record_file_restored(10);
        registry.record_file_restored(32);
        registry.increment_restores();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.files_restored, 2);
        assert_eq!(snapshot.bytes_restored, 42);
        assert_eq!(snapshot.restores_performed, 1);
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        registry.increment_dangling();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().dangling_references, 400);
    }
}
