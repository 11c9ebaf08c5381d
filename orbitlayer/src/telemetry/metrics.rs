//! Atomic pipeline counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::TelemetrySnapshot;
use crate::propagation::BatchStats;

/// Counters shared by the controller and the worker.
///
/// Every method is a relaxed atomic update, safe to call from any thread.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    requests_accepted: AtomicU64,
    requests_dropped: AtomicU64,
    batches_completed: AtomicU64,
    batches_rejected: AtomicU64,
    protocol_violations: AtomicU64,
    objects_loaded: AtomicU64,
    build_failures: AtomicU64,
    batches_propagated: AtomicU64,
    last_batch_valid: AtomicU64,
    last_batch_failed: AtomicU64,
    last_batch_micros: AtomicU64,
    total_batch_micros: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Interactive side
    // =========================================================================

    /// An update request was dispatched to the worker.
    pub fn request_accepted(&self) {
        self.requests_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// An update request was dropped (pending, not ready, or disconnected).
    pub fn request_dropped(&self) {
        self.requests_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A completed buffer became current.
    pub fn batch_completed(&self) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// A completed buffer was discarded.
    pub fn batch_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A message arrived that the receiving side did not expect.
    pub fn protocol_violation(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    // =========================================================================
    // Background side
    // =========================================================================

    /// Handle construction finished for `total` records, `failures` of which
    /// produced no handle.
    pub fn handles_built(&self, total: usize, failures: usize) {
        self.objects_loaded.store(total as u64, Ordering::Relaxed);
        self.build_failures.store(failures as u64, Ordering::Relaxed);
    }

    /// A batch finished on the worker.
    pub fn batch_propagated(&self, stats: &BatchStats) {
        let micros = stats.elapsed.as_micros() as u64;
        self.batches_propagated.fetch_add(1, Ordering::Relaxed);
        self.last_batch_valid.store(stats.valid as u64, Ordering::Relaxed);
        self.last_batch_failed.store(stats.failed as u64, Ordering::Relaxed);
        self.last_batch_micros.store(micros, Ordering::Relaxed);
        self.total_batch_micros.fetch_add(micros, Ordering::Relaxed);
    }

    /// Copy every counter.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            requests_accepted: self.requests_accepted.load(Ordering::Relaxed),
            requests_dropped: self.requests_dropped.load(Ordering::Relaxed),
            batches_completed: self.batches_completed.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            protocol_violations: self.protocol_violations.load(Ordering::Relaxed),
            objects_loaded: self.objects_loaded.load(Ordering::Relaxed),
            build_failures: self.build_failures.load(Ordering::Relaxed),
            batches_propagated: self.batches_propagated.load(Ordering::Relaxed),
            last_batch_valid: self.last_batch_valid.load(Ordering::Relaxed),
            last_batch_failed: self.last_batch_failed.load(Ordering::Relaxed),
            last_batch_micros: self.last_batch_micros.load(Ordering::Relaxed),
            total_batch_micros: self.total_batch_micros.load(Ordering::Relaxed),
        }
    }
}
