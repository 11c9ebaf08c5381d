//! Shared fixtures for unit tests.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::catalog::CompactRecord;
use crate::ephemeris::{Propagator, PropagatorError, StateVector};

/// A valid low-earth-orbit record.
pub(crate) fn record(id: i64, name: &str) -> CompactRecord {
    CompactRecord {
        id,
        name: name.to_string(),
        epoch_unix_seconds: 1_700_000_000.0,
        inclination_deg: 51.6,
        raan_deg: 120.0,
        eccentricity: 0.0005,
        arg_perigee_deg: 90.0,
        mean_anomaly_deg: 45.0,
        mean_motion_rev_per_day: 15.5,
        bstar: 0.0,
    }
}

pub(crate) fn instant(unix_seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0).expect("valid timestamp")
}

/// Handle produced by [`FakePropagator`]: just the catalog number.
#[derive(Debug, Clone)]
pub(crate) struct FakeHandle {
    pub id: i64,
}

/// Scripted propagator.
///
/// Positions are `(7000 + id, seconds % 1000, id)` km in the inertial frame,
/// sidereal time is fixed, ids in `rejected` fail to build and ids in
/// `failing` build but never yield a position.
#[derive(Debug, Default)]
pub(crate) struct FakePropagator {
    rejected: HashSet<i64>,
    failing: HashSet<i64>,
    sidereal: f64,
}

impl FakePropagator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting(mut self, id: i64) -> Self {
        self.rejected.insert(id);
        self
    }

    pub(crate) fn failing(mut self, id: i64) -> Self {
        self.failing.insert(id);
        self
    }

    pub(crate) fn with_sidereal(mut self, sidereal: f64) -> Self {
        self.sidereal = sidereal;
        self
    }
}

impl Propagator for FakePropagator {
    type Handle = FakeHandle;

    fn build_handle(&self, line1: &str, _line2: &str) -> Result<FakeHandle, PropagatorError> {
        let id: i64 = line1
            .get(2..7)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PropagatorError::Parse("bad catalog number".to_string()))?;
        if self.rejected.contains(&id) {
            return Err(PropagatorError::Parse(format!("rejected {}", id)));
        }
        Ok(FakeHandle { id })
    }

    fn state_at(&self, handle: &FakeHandle, instant: DateTime<Utc>) -> StateVector {
        if self.failing.contains(&handle.id) {
            return StateVector::invalid();
        }
        let t = instant.timestamp().rem_euclid(1000) as f64;
        StateVector::from_raw([7000.0 + handle.id as f64, t, handle.id as f64], [0.0, 7.5, 0.0])
    }

    fn sidereal_time(&self, _instant: DateTime<Utc>) -> f64 {
        self.sidereal
    }
}
