//! Pipeline counters.
//!
//! Monotonic counters updated by the actor (and, for drops, by the enqueue
//! path) and read from any context as an immutable snapshot. These are the
//! only pieces of pipeline state visible outside the actor; `pending` and
//! `unique_seen` themselves are never shared.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter cells. Wrapped in an `Arc` by the pipeline.
#[derive(Debug, Default)]
pub struct Counters {
    received: AtomicU64,
    persisted: AtomicU64,
    repeats: AtomicU64,
    dropped: AtomicU64,
    flush_failures: AtomicU64,
}

/// Point-in-time copy of the counters, safe to poll from any context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    /// Observations the actor dequeued, duplicates included.
    pub received: u64,
    /// Unique observations durably persisted across all flushes.
    pub persisted: u64,
    /// Observations dropped as repeats of an already-seen identifier.
    pub repeats: u64,
    /// Observations dropped at enqueue because the command queue was full.
    pub dropped: u64,
    /// Flushes whose persistence call failed (the batch was retained).
    pub flush_failures: u64,
}

impl Counters {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persisted(&self, count: u64) {
        self.persisted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_repeat(&self) {
        self.repeats.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_failure(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough snapshot (each counter individually exact).
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            received: self.received.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            repeats: self.repeats.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let counters = Counters::default();
        counters.record_received();
        counters.record_received();
        counters.record_repeat();
        counters.record_persisted(5);
        let snap = counters.snapshot();
        assert_eq!(snap.received, 2);
        assert_eq!(snap.repeats, 1);
        assert_eq!(snap.persisted, 5);
        assert_eq!(snap.dropped, 0);
    }
}
