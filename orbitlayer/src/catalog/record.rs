//! Compact orbital element records.
//!
//! A [`CompactRecord`] is the minimal description of one orbiting object:
//! its catalog identity plus the mean elements at epoch. The on-disk form is
//! a positional 10-element JSON array:
//!
//! ```text
//! [id, name, epoch_unix, incl_deg, raan_deg, ecc, argp_deg, ma_deg, mm_rev_per_day, bstar]
//! ```

use serde::{Deserialize, Serialize};

/// One object's identity and osculating elements.
///
/// Records are immutable once loaded. The position of a record inside its
/// [`Catalog`](super::Catalog) is the object's slot index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordFields", into = "RecordFields")]
pub struct CompactRecord {
    /// Catalog number (NORAD id).
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Element epoch as UTC seconds since the Unix epoch.
    pub epoch_unix_seconds: f64,
    /// Inclination in degrees.
    pub inclination_deg: f64,
    /// Right ascension of the ascending node in degrees.
    pub raan_deg: f64,
    /// Eccentricity (dimensionless, `0 <= e < 1`).
    pub eccentricity: f64,
    /// Argument of perigee in degrees.
    pub arg_perigee_deg: f64,
    /// Mean anomaly in degrees.
    pub mean_anomaly_deg: f64,
    /// Mean motion in revolutions per day.
    pub mean_motion_rev_per_day: f64,
    /// Drag term. Carried for completeness; not used to build handles.
    pub bstar: f64,
}

/// Positional wire form of a record.
#[derive(Serialize, Deserialize)]
struct RecordFields(i64, String, f64, f64, f64, f64, f64, f64, f64, f64);

impl From<RecordFields> for CompactRecord {
    fn from(f: RecordFields) -> Self {
        Self {
            id: f.0,
            name: f.1,
            epoch_unix_seconds: f.2,
            inclination_deg: f.3,
            raan_deg: f.4,
            eccentricity: f.5,
            arg_perigee_deg: f.6,
            mean_anomaly_deg: f.7,
            mean_motion_rev_per_day: f.8,
            bstar: f.9,
        }
    }
}

impl From<CompactRecord> for RecordFields {
    fn from(r: CompactRecord) -> Self {
        RecordFields(
            r.id,
            r.name,
            r.epoch_unix_seconds,
            r.inclination_deg,
            r.raan_deg,
            r.eccentricity,
            r.arg_perigee_deg,
            r.mean_anomaly_deg,
            r.mean_motion_rev_per_day,
            r.bstar,
        )
    }
}

impl CompactRecord {
    /// Orbital period in minutes, derived from the mean motion.
    ///
    /// Returns `None` for a non-positive or non-finite mean motion.
    pub fn period_minutes(&self) -> Option<f64> {
        let n = self.mean_motion_rev_per_day;
        if n.is_finite() && n > 0.0 {
            Some(super::MINUTES_PER_DAY / n)
        } else {
            None
        }
    }

    /// Whether this record matches a search query.
    ///
    /// The stringified id must equal the query exactly, or the name must
    /// contain the query case-insensitively. `lowered_query` is the query
    /// already lowercased so a scan lowercases it once.
    pub(crate) fn matches(&self, query: &str, lowered_query: &str) -> bool {
        self.id.to_string() == query || self.name.to_lowercase().contains(lowered_query)
    }
}
