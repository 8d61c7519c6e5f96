//! Facade-Side Cache Counters
//!
//! Client-side view of cache behavior, independent of the store's own
//! counters. Cache-line friendly atomics with relaxed ordering; snapshots
//! are taken for the stats surface.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Facade Metrics
// =============================================================================

/// Counters recorded by the smart cache facade
#[derive(Debug, Default)]
pub struct FacadeMetrics {
    /// Reads answered from the store
    hits: AtomicU64,
    /// Reads degraded to recompute (true misses and absorbed failures)
    misses: AtomicU64,
    /// Reads and writes rejected by the access validator
    denials: AtomicU64,
    /// Writes accepted by the store
    writes: AtomicU64,
    /// Writes the store rejected or that failed in transport
    write_failures: AtomicU64,
}

impl FacadeMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_denial(&self) {
        self.denials.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent-enough snapshot for reporting
    pub fn snapshot(&self) -> FacadeMetricsSnapshot {
        FacadeMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            denials: self.denials.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of facade counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct FacadeMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub denials: u64,
    pub writes: u64,
    pub write_failures: u64,
}

impl FacadeMetricsSnapshot {
    /// Hit ratio over reads that reached the store
    pub fn hit_ratio(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}
