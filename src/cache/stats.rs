//! Cache Statistics Module
//!
//! Tracks reads, insert races and sweep activity. Counters are plain atomics
//! updated from any thread; [`CacheStats`] is a point-in-time copy.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counter ==
/// Live counters shared by the cache and its sweeper.
#[derive(Debug, Default)]
pub struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    rejected_inserts: AtomicU64,
    sweeps: AtomicU64,
    swept: AtomicU64,
}

impl StatsCounter {
    /// Creates a counter set with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a read that found a live entry.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a read that found nothing live.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of an insert-if-absent.
    pub fn record_insert(&self, won: bool) {
        if won {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected_inserts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records one completed sweep that removed `removed` entries.
    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept.fetch_add(removed as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the current counter values.
    pub fn snapshot(&self, live_entries: usize, physical_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            rejected_inserts: self.rejected_inserts.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            live_entries,
            physical_entries,
        }
    }
}

// == Cache Stats ==
/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Adds that stored their value
    pub inserts: u64,
    /// Adds that lost to an existing live entry
    pub rejected_inserts: u64,
    /// Completed sweep passes
    pub sweeps: u64,
    /// Entries physically removed by sweeps
    pub swept: u64,
    /// Live entries across all namespaces
    pub live_entries: usize,
    /// Physically present entries, including not-yet-swept expired ones
    pub physical_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_new() {
        let stats = StatsCounter::new().snapshot(0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counter = StatsCounter::new();
        counter.record_hit();
        counter.record_hit();
        counter.record_hit();
        counter.record_miss();
        assert_eq!(counter.snapshot(0, 0).hit_rate(), 0.75);
    }

    #[test]
    fn test_record_insert_outcomes() {
        let counter = StatsCounter::new();
        counter.record_insert(true);
        counter.record_insert(false);
        counter.record_insert(false);

        let stats = counter.snapshot(1, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.rejected_inserts, 2);
    }

    #[test]
    fn test_record_sweep() {
        let counter = StatsCounter::new();
        counter.record_sweep(3);
        counter.record_sweep(0);

        let stats = counter.snapshot(0, 0);
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.swept, 3);
    }

    #[test]
    fn test_snapshot_serializes() {
        let counter = StatsCounter::new();
        counter.record_hit();

        let json = serde_json::to_value(counter.snapshot(4, 5)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["live_entries"], 4);
        assert_eq!(json["physical_entries"], 5);
    }
}
