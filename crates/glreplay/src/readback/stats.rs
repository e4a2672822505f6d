use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of readback counters, suitable for profiling/telemetry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadbackStatsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    /// Requests that attached to an already in-flight resolution.
    pub joins: u64,
    /// Staging sequences actually run against a session.
    pub extractions: u64,
    pub failures: u64,
    pub cancellations: u64,
}

#[derive(Debug, Default)]
pub struct ReadbackStats {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    joins: AtomicU64,
    extractions: AtomicU64,
    failures: AtomicU64,
    cancellations: AtomicU64,
}

impl ReadbackStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_joins(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_extractions(&self) {
        self.extractions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cancellations(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReadbackStatsSnapshot {
        ReadbackStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            extractions: self.extractions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}
