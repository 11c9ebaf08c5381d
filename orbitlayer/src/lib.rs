//! OrbitLayer - batched orbital-state pipeline for real-time visualization
//!
//! This library drives thousands of per-object 3D transforms from propagated
//! orbital positions while keeping the interactive thread free of heavy
//! computation.
//!
//! # Architecture
//!
//! ```text
//!   catalog ──► ephemeris ──► propagation ──► pipeline ──► render
//!  (records)   (handles,     (PositionBuffer)  (single     (instances)
//!               once)                          in flight)      ▲
//!                                                              │
//!                                           selection ─────────┘
//! ```
//!
//! - [`catalog`] - compact records, loading and search
//! - [`ephemeris`] - two-line interchange records and propagator handles
//! - [`propagation`] - whole-population batch propagation
//! - [`pipeline`] - interactive/background boundary
//! - [`render`] - frame mapping and instance updates
//! - [`selection`] - picking and hover/select state
//! - [`layer`] - per-tick facade composing the above
//! - [`clock`], [`track`] - simulated time and selected-object insight
//! - [`config`], [`logging`], [`telemetry`] - ambient services

pub mod catalog;
pub mod clock;
pub mod config;
pub mod ephemeris;
pub mod layer;
pub mod logging;
pub mod pipeline;
pub mod propagation;
pub mod render;
pub mod selection;
pub mod telemetry;
pub mod track;

#[cfg(test)]
mod test_support;
