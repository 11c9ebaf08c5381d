//! Insight for the selected object: orbit path and live summary.
//!
//! ```text
//! CompactRecord ──► OrbitTracker ──► [TrackPoint; samples + 1]   (one period)
//!                        │
//!                        └─────────► ObjectSummary              (lat, lon, alt, period, speed)
//! ```

mod geodetic;
mod orbit;

pub use geodetic::{geodetic_from_earth_fixed, Geodetic, WGS84_A, WGS84_F};
pub use orbit::{ObjectSummary, OrbitTracker, TrackPoint, DEFAULT_TRACK_SAMPLES};
