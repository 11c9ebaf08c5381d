//! Ephemeris construction.
//!
//! Turns each [`CompactRecord`](crate::catalog::CompactRecord) into opaque
//! propagator state, once, at load time.
//!
//! # Architecture
//!
//! ```text
//! CompactRecord ──► interchange::format_record ──► (line1, line2)
//!                                                        │
//!                                                        ▼
//!                                       Propagator::build_handle ──► Handle
//!                                                        │
//!                                            error ──────┴──► Absent (counted)
//! ```
//!
//! A malformed record never aborts a batch: it yields an absent slot, and
//! [`HandleSet::failures`] reports how many there were.

mod builder;
mod interchange;
mod propagator;
mod sidereal;

pub use builder::{EphemerisBuilder, HandleSet};
pub use interchange::{checksum, format_record, EpochFields, InterchangeRecord, LINE_LENGTH};
pub use propagator::{Propagator, PropagatorError, Sgp4Handle, Sgp4Propagator, StateVector};
pub use sidereal::{greenwich_mean_sidereal_time, rotate_to_earth_fixed};

use thiserror::Error;

/// Reasons a compact record cannot become a propagator handle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EphemerisError {
    /// Catalog number does not fit the 5-digit field.
    #[error("Catalog number {0} does not fit the interchange format")]
    InvalidId(i64),

    /// A numeric field is NaN or infinite.
    #[error("Field '{field}' is not finite")]
    NonFinite { field: &'static str },

    /// A numeric field is outside its physical range.
    #[error("Field '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// A field rendered wider than its fixed column.
    #[error("Field '{field}' rendered as '{rendered}' exceeds {width} columns")]
    FieldOverflow {
        field: &'static str,
        rendered: String,
        width: usize,
    },

    /// The epoch cannot be expressed in the interchange format.
    #[error("Epoch {0} cannot be represented")]
    InvalidEpoch(f64),

    /// A synthesized line had the wrong length.
    #[error("Synthesized line has {length} columns")]
    MalformedLine { length: usize },

    /// The propagator rejected the synthesized record.
    #[error(transparent)]
    Propagator(#[from] PropagatorError),
}
