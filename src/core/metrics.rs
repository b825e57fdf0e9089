//! Dispatch metrics for observability
//!
//! Counters describing what the dispatcher did with queued items: how many
//! were routed, how many sink writes happened or failed, and how many drain
//! cycles ran.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between a dispatcher and whoever watches it.
///
/// # Example
///
/// ```
/// use log_dispatch::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_dispatched();
/// metrics.record_sink_write();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.sink_writes(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Items popped from the queue and routed
    dispatched: AtomicU64,

    /// Successful `Sink::send` calls
    sink_writes: AtomicU64,

    /// `Sink::send` or `Sink::flush` calls that returned an error
    sink_failures: AtomicU64,

    /// Items whose severity resolved to no sink at all
    unrouted: AtomicU64,

    /// Completed or aborted calls to `drain_once`
    drain_cycles: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            sink_writes: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
            drain_cycles: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_writes(&self) -> u64 {
        self.sink_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn unrouted(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn drain_cycles(&self) -> u64 {
        self.drain_cycles.load(Ordering::Relaxed)
    }

    /// Record a routed item; returns the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_write(&self) -> u64 {
        self.sink_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unrouted(&self) -> u64 {
        self.unrouted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_drain_cycle(&self) -> u64 {
        self.drain_cycles.fetch_add(1, Ordering::Relaxed)
    }

    /// Sink failure rate as a percentage of attempted writes (0.0 - 100.0)
    pub fn failure_rate(&self) -> f64 {
        let failed = self.sink_failures() as f64;
        let total = self.sink_writes() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.sink_writes.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.unrouted.store(0, Ordering::Relaxed);
        self.drain_cycles.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            sink_writes: AtomicU64::new(self.sink_writes()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            unrouted: AtomicU64::new(self.unrouted()),
            drain_cycles: AtomicU64::new(self.drain_cycles()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.sink_writes(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.unrouted(), 0);
        assert_eq!(metrics.drain_cycles(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.record_dispatched(), 0);
        assert_eq!(metrics.record_dispatched(), 1);
        assert_eq!(metrics.dispatched(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_sink_write();
        }
        for _ in 0..10 {
            metrics.record_sink_failure();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let metrics = DispatchMetrics::new();
        metrics.record_unrouted();

        let snapshot = metrics.clone();
        metrics.record_unrouted();
        metrics.reset();

        assert_eq!(snapshot.unrouted(), 1);
        assert_eq!(metrics.unrouted(), 0);
    }
}
