//! Ingest-path counters for observability
//!
//! Tracks rescue-path and backpressure events. All counters are relaxed;
//! readers get eventually-consistent snapshots, which is all the surface
//! promises.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct EngineMetrics {
    /// Entries that took the fallback path because the ring was full.
    overflow_events: AtomicU64,
    /// Final-resort spins when both queues refused an entry.
    backpressure_spins: AtomicU64,
}

impl EngineMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            overflow_events: AtomicU64::new(0),
            backpressure_spins: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn overflow_events(&self) -> u64 {
        self.overflow_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn backpressure_spins(&self) -> u64 {
        self.backpressure_spins.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_overflow(&self) {
        self.overflow_events.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_backpressure(&self) {
        self.backpressure_spins.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset both counters; intended for tests.
    pub fn reset(&self) {
        self.overflow_events.store(0, Ordering::Relaxed);
        self.backpressure_spins.store(0, Ordering::Relaxed);
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.overflow_events(), 0);
        assert_eq!(metrics.backpressure_spins(), 0);
    }

    #[test]
    fn test_record_and_read() {
        let metrics = EngineMetrics::new();
        metrics.record_overflow();
        metrics.record_overflow();
        metrics.record_backpressure();
        assert_eq!(metrics.overflow_events(), 2);
        assert_eq!(metrics.backpressure_spins(), 1);
    }

    #[test]
    fn test_reset() {
        let metrics = EngineMetrics::new();
        metrics.record_overflow();
        metrics.record_backpressure();
        metrics.reset();
        assert_eq!(metrics.overflow_events(), 0);
        assert_eq!(metrics.backpressure_spins(), 0);
    }
}
