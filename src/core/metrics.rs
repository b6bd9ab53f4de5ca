//! Logger metrics for observability
//!
//! Write-path failures are never returned to callers, so these counters are
//! the only way to notice a logger that has been silently dropping lines.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single logger
///
/// # Example
///
/// ```
/// use logtic::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.lines_written(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Lines successfully appended to the log file
    lines_written: AtomicU64,

    /// Lines that failed to reach the log file
    dropped_count: AtomicU64,

    /// Completed rotations
    rotations: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            lines_written: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Record a line written to the file, returning the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.lines_written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed file write, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.lines_written() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.lines_written.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            lines_written: AtomicU64::new(self.lines_written()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            rotations: AtomicU64::new(self.rotations()),
        }
    }
}
