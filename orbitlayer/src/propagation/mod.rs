//! Batch propagation into packed Earth-fixed position buffers.
//!
//! ```text
//! [Option<Handle>; N] ──► BatchPropagator::propagate(instant) ──► PositionBuffer (3 × N f32)
//! ```

mod batch;
mod buffer;

pub use batch::{BatchPropagator, BatchStats, PropagationConfig, DEFAULT_PARALLEL_THRESHOLD};
pub use buffer::{is_sentinel, PositionBuffer, COMPONENTS};
