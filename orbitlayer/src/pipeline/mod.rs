//! Two-context propagation pipeline.
//!
//! The interactive context owns a [`PipelineController`]; the background
//! context runs a [`PropagationWorker`]. They share no mutable state and talk
//! only through [`PipelineMessage`]s over two channels:
//!
//! ```text
//!  ┌──────────────────────┐   Init / UpdateRequest    ┌──────────────────────┐
//!  │  PipelineController  │ ────────────────────────► │  PropagationWorker   │
//!  │  (interactive, poll) │                           │  (tokio task)        │
//!  │                      │ ◄──────────────────────── │  EphemerisBuilder    │
//!  └──────────────────────┘   Ready / UpdateComplete  │  BatchPropagator     │
//!                                                     └──────────────────────┘
//! ```

mod controller;
mod message;
mod worker;

pub use controller::{PipelineController, PipelineState, PollOutcome};
pub use message::PipelineMessage;
pub use worker::PropagationWorker;

use thiserror::Error;

/// Errors raised at the interactive side of the pipeline boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A completed buffer did not hold exactly `3 × N` values.
    #[error("buffer length mismatch: expected {expected} values, got {actual}")]
    BufferLengthMismatch { expected: usize, actual: usize },

    /// A completion arrived while no request was outstanding.
    #[error("batch completion received with no request outstanding")]
    UnexpectedCompletion,

    /// `init` was called more than once.
    #[error("pipeline already initialized")]
    AlreadyInitialized,

    /// The background worker is gone.
    #[error("propagation worker disconnected")]
    Disconnected,
}
