//! Point-in-time copy of the pipeline counters.

use std::fmt;

/// Plain copy of [`PipelineMetrics`](super::PipelineMetrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetrySnapshot {
    pub requests_accepted: u64,
    pub requests_dropped: u64,
    pub batches_completed: u64,
    pub batches_rejected: u64,
    pub protocol_violations: u64,
    pub objects_loaded: u64,
    pub build_failures: u64,
    pub batches_propagated: u64,
    pub last_batch_valid: u64,
    pub last_batch_failed: u64,
    pub last_batch_micros: u64,
    pub total_batch_micros: u64,
}

impl TelemetrySnapshot {
    /// Mean batch time in milliseconds, zero before the first batch.
    pub fn average_batch_ms(&self) -> f64 {
        if self.batches_propagated == 0 {
            return 0.0;
        }
        self.total_batch_micros as f64 / self.batches_propagated as f64 / 1000.0
    }

    /// Fraction of update requests that were dropped.
    pub fn drop_ratio(&self) -> f64 {
        let total = self.requests_accepted + self.requests_dropped;
        if total == 0 {
            return 0.0;
        }
        self.requests_dropped as f64 / total as f64
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "objects:   {} loaded, {} without handle",
            self.objects_loaded, self.build_failures
        )?;
        writeln!(
            f,
            "requests:  {} dispatched, {} dropped ({:.1}%)",
            self.requests_accepted,
            self.requests_dropped,
            self.drop_ratio() * 100.0
        )?;
        writeln!(
            f,
            "batches:   {} applied, {} rejected, {} protocol violations",
            self.batches_completed, self.batches_rejected, self.protocol_violations
        )?;
        write!(
            f,
            "last:      {} valid, {} sentinel, {:.2} ms (avg {:.2} ms)",
            self.last_batch_valid,
            self.last_batch_failed,
            self.last_batch_micros as f64 / 1000.0,
            self.average_batch_ms()
        )
    }
}
