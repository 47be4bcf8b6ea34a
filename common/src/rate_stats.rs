//! Windowed frequency and throughput statistics
//!
//! Rates are measured across the span of the samples currently held in the
//! window rather than since the first arrival, so the numbers follow recent
//! behaviour and recover when a publisher changes rate.

use crate::error::Result;
use crate::rolling_window::RollingWindow;

/// Number of samples kept per subscription unless configured otherwise
pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// Point-in-time view of a stream's rates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateSnapshot {
    pub hz: f64,
    pub bandwidth_kbps: f64,
}

#[derive(Debug, Clone)]
pub struct RateStats {
    timestamps: RollingWindow<u64>,
    sizes: RollingWindow<u64>,
}

impl RateStats {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            timestamps: RollingWindow::new(capacity)?,
            sizes: RollingWindow::new(capacity)?,
        })
    }

    /// Record one arrival: its timestamp in milliseconds and size in bytes
    pub fn record(&mut self, timestamp_ms: u64, size: u64) {
        self.timestamps.add(timestamp_ms);
        self.sizes.add(size);
    }

    /// Number of samples currently in the window
    pub fn count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn capacity(&self) -> usize {
        self.timestamps.capacity()
    }

    pub fn snapshot(&self) -> RateSnapshot {
        let (Some(oldest), Some(newest)) = (self.timestamps.oldest(), self.timestamps.newest())
        else {
            return RateSnapshot::default();
        };

        // Out-of-order stamps collapse to a zero span
        let span = newest.saturating_sub(*oldest) as f64 / 1000.0;
        if span <= 0.0 {
            return RateSnapshot::default();
        }

        let count = self.timestamps.len();
        let hz = if count >= 2 { (count - 1) as f64 / span } else { 0.0 };
        let total: u64 = self.sizes.iter().sum();

        RateSnapshot {
            hz,
            bandwidth_kbps: total as f64 / span / 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fresh_stats_are_zero() {
        let stats = RateStats::new(50).unwrap();
        assert_eq!(stats.snapshot(), RateSnapshot::default());
    }

    #[test]
    fn single_sample_has_no_rate() {
        let mut stats = RateStats::new(50).unwrap();
        stats.record(1_000, 512);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hz, 0.0);
        assert!(snapshot.bandwidth_kbps.is_finite());
    }

    #[test]
    fn identical_timestamps_report_zero() {
        let mut stats = RateStats::new(50).unwrap();
        for size in [10, 20, 30] {
            stats.record(1_000, size);
        }
        assert_eq!(stats.snapshot(), RateSnapshot::default());
    }

    #[test]
    fn rates_over_one_second_span() {
        let mut stats = RateStats::new(50).unwrap();
        for t in [0, 500, 1_000] {
            stats.record(t, 100);
        }

        let snapshot = stats.snapshot();
        assert_close(snapshot.hz, 2.0);
        assert_close(snapshot.bandwidth_kbps, 0.3);
    }

    #[test]
    fn only_recent_samples_count() {
        let mut stats = RateStats::new(3).unwrap();
        // A slow start followed by a 10 Hz burst
        for t in [0, 5_000, 10_000] {
            stats.record(t, 1_000);
        }
        for t in [10_100, 10_200, 10_300] {
            stats.record(t, 1_000);
        }

        assert_eq!(stats.count(), 3);
        assert_close(stats.snapshot().hz, 10.0);
    }

    #[test]
    fn backwards_timestamps_do_not_go_negative() {
        let mut stats = RateStats::new(2).unwrap();
        stats.record(2_000, 10);
        stats.record(1_000, 10);
        assert_eq!(stats.snapshot(), RateSnapshot::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(RateStats::new(0).unwrap_err(), Error::ZeroCapacity);
    }
}
