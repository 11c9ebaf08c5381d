//! Pipeline telemetry.
//!
//! Lock-free counters recorded by both pipeline contexts and read back as a
//! point-in-time snapshot. Counters are observability only; no pipeline
//! decision is ever made from them.
//!
//! ```text
//! PipelineController ─┐
//!                     ├──► PipelineMetrics ──► TelemetrySnapshot ──► CLI / logs
//! PropagationWorker ──┘    (atomic counters)   (plain copy)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use orbitlayer::telemetry::PipelineMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(PipelineMetrics::new());
//! metrics.request_accepted();
//! metrics.batch_completed();
//!
//! let snapshot = metrics.snapshot();
//! println!("{}", snapshot);
//! ```

mod metrics;
mod snapshot;

pub use metrics::PipelineMetrics;
pub use snapshot::TelemetrySnapshot;
