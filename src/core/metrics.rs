//! Logger metrics for observability
//!
//! Counters shared between producers and the worker thread. Producers only
//! ever touch `rejected`; the worker owns the other three.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use spectral_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_written();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_written(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Lines durably written to the sink
    total_written: AtomicU64,

    /// Lines lost after the reopen-and-retry also failed
    dropped_count: AtomicU64,

    /// Submissions the queue refused (closed or full)
    rejected_count: AtomicU64,

    /// Writes that succeeded only after reopening the sink
    recovered_writes: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_written: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            rejected_count: AtomicU64::new(0),
            recovered_writes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_written(&self) -> u64 {
        self.total_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn recovered_writes(&self) -> u64 {
        self.recovered_writes.load(Ordering::Relaxed)
    }

    /// Record a written line, returning the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.total_written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a dropped line, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a rejected submission, returning the previous count
    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_recovered(&self) -> u64 {
        self.recovered_writes.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Rejected submissions count as dropped. Returns 0.0 if nothing has
    /// been processed.
    pub fn drop_rate(&self) -> f64 {
        let lost = (self.dropped_count() + self.rejected_count()) as f64;
        let total = self.total_written() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
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
            total_written: AtomicU64::new(self.total_written()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            rejected_count: AtomicU64::new(self.rejected_count()),
            recovered_writes: AtomicU64::new(self.recovered_writes()),
        }
    }
}
