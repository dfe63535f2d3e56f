//! Global atomic counters for Tracegrade observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI command).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, lock-free and allocation-free.
pub struct Metrics {
    items_scored: AtomicU64,
    items_failed: AtomicU64,
    reports_generated: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            items_scored: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
            reports_generated: AtomicU64::new(0),
        }
    }

    pub fn inc_items_scored(&self) {
        self.items_scored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "items_scored", "counter incremented");
    }

    /// Items whose overall score fell below the pass bar.
    pub fn inc_items_failed(&self) {
        self.items_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "items_failed", "counter incremented");
    }

    pub fn inc_reports(&self) {
        self.reports_generated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "reports_generated", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            items_scored = self.items_scored(),
            items_failed = self.items_failed(),
            reports_generated = self.reports_generated(),
        );
    }

    pub fn items_scored(&self) -> u64 {
        self.items_scored.load(Ordering::Relaxed)
    }

    pub fn items_failed(&self) -> u64 {
        self.items_failed.load(Ordering::Relaxed)
    }

    pub fn reports_generated(&self) -> u64 {
        self.reports_generated.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.items_scored.store(0, Ordering::Relaxed);
        self.items_failed.store(0, Ordering::Relaxed);
        self.reports_generated.store(0, Ordering::Relaxed);
    }
}
