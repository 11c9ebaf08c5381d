//! Batch propagation of the whole population to one instant.
//!
//! This is the single CPU-bound hot path. It is linear in the object count
//! and always runs on the background context, never on the interactive one.
//!
//! # Guarantees
//!
//! - The output always holds exactly `3 × N` values.
//! - The batch never fails as a whole: an absent handle or a failed
//!   propagation writes the `(0, 0, 0)` sentinel for that slot only.
//! - Sequential and parallel execution produce identical buffers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use super::buffer::{PositionBuffer, COMPONENTS};
use crate::ephemeris::Propagator;

/// Default object count above which batches are split across rayon workers.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

/// Batch propagation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationConfig {
    /// Split large batches across the rayon pool.
    pub parallel: bool,
    /// Minimum object count for a parallel batch.
    pub parallel_threshold: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl PropagationConfig {
    /// Sequential-only configuration.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Outcome counters for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    /// Slots with a valid Earth-fixed position.
    pub valid: usize,
    /// Slots written as the sentinel (absent handle or failed propagation).
    pub failed: usize,
    /// Wall time spent in the batch.
    pub elapsed: Duration,
}

/// Propagates every handle to a single instant.
pub struct BatchPropagator<P: Propagator> {
    propagator: Arc<P>,
    config: PropagationConfig,
}

impl<P: Propagator> BatchPropagator<P> {
    pub fn new(propagator: Arc<P>, config: PropagationConfig) -> Self {
        Self { propagator, config }
    }

    /// Propagate all handles to `instant`.
    pub fn propagate(&self, handles: &[Option<P::Handle>], instant: DateTime<Utc>) -> PositionBuffer {
        self.propagate_with_stats(handles, instant).0
    }

    /// Propagate all handles to `instant`, also returning batch counters.
    pub fn propagate_with_stats(
        &self,
        handles: &[Option<P::Handle>],
        instant: DateTime<Utc>,
    ) -> (PositionBuffer, BatchStats) {
        let start = Instant::now();
        let mut buffer = PositionBuffer::zeroed(handles.len());
        let sidereal = self.propagator.sidereal_time(instant);
        let propagator = self.propagator.as_ref();

        let parallel = self.config.parallel && handles.len() >= self.config.parallel_threshold;
        let valid = if parallel {
            buffer
                .as_mut_slice()
                .par_chunks_mut(COMPONENTS)
                .zip(handles.par_iter())
                .map(|(slot, handle)| write_slot(propagator, handle, instant, sidereal, slot))
                .filter(|&valid| valid)
                .count()
        } else {
            buffer
                .as_mut_slice()
                .chunks_mut(COMPONENTS)
                .zip(handles.iter())
                .map(|(slot, handle)| write_slot(propagator, handle, instant, sidereal, slot))
                .filter(|&valid| valid)
                .count()
        };

        let stats = BatchStats {
            valid,
            failed: handles.len() - valid,
            elapsed: start.elapsed(),
        };

        debug!(
            objects = handles.len(),
            valid = stats.valid,
            failed = stats.failed,
            parallel,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "Propagated batch"
        );

        (buffer, stats)
    }
}

/// Write one slot; returns whether a valid position was written.
///
/// `slot` is already zeroed, so failure paths leave the sentinel in place.
fn write_slot<P: Propagator>(
    propagator: &P,
    handle: &Option<P::Handle>,
    instant: DateTime<Utc>,
    sidereal: f64,
    slot: &mut [f32],
) -> bool {
    let Some(handle) = handle else {
        return false;
    };
    let Some(inertial) = propagator.state_at(handle, instant).position else {
        return false;
    };

    let fixed = propagator.inertial_to_earth_fixed(inertial, sidereal);
    let packed = fixed.map(|c| c as f32);
    if packed.iter().any(|c| !c.is_finite()) || packed == [0.0, 0.0, 0.0] {
        return false;
    }

    slot.copy_from_slice(&packed);
    true
}
