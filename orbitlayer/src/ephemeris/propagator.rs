//! Propagator collaborator contract and the SGP4 adapter.
//!
//! The orbital mechanics are a black box behind the [`Propagator`] trait:
//! build a handle from two interchange lines, ask it for an inertial state at
//! an instant, and rotate that state into the Earth-fixed frame. Batch code is
//! generic over the trait so it can be driven by [`Sgp4Propagator`] in
//! production and by scripted fakes in tests.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::sidereal::{greenwich_mean_sidereal_time, rotate_to_earth_fixed};

/// Errors reported by a propagator while building a handle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropagatorError {
    /// The interchange lines could not be parsed.
    #[error("Interchange record rejected: {0}")]
    Parse(String),

    /// The parsed elements could not initialize the propagation model.
    #[error("Propagation model initialization failed: {0}")]
    Initialization(String),
}

/// Inertial state returned by [`Propagator::state_at`].
///
/// `position` is `None` when the model could not produce a usable state at
/// the requested instant (decay, numerical breakdown, non-finite output).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateVector {
    /// Position in km.
    pub position: Option<[f64; 3]>,
    /// Velocity in km/s.
    pub velocity: Option<[f64; 3]>,
}

impl StateVector {
    /// Build a state from raw model output, discarding non-finite vectors.
    pub fn from_raw(position: [f64; 3], velocity: [f64; 3]) -> Self {
        let finite = |v: [f64; 3]| v.iter().all(|c| c.is_finite()).then_some(v);
        Self {
            position: finite(position),
            velocity: finite(velocity),
        }
    }

    /// A state with no valid vectors.
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// The external propagator.
///
/// Implementations must be shareable across the background worker and its
/// blocking batch tasks.
pub trait Propagator: Send + Sync + 'static {
    /// Opaque per-object propagation state.
    type Handle: Send + Sync + 'static;

    /// Build a handle from a pair of interchange lines.
    fn build_handle(&self, line1: &str, line2: &str) -> Result<Self::Handle, PropagatorError>;

    /// Inertial state of `handle` at `instant`.
    fn state_at(&self, handle: &Self::Handle, instant: DateTime<Utc>) -> StateVector;

    /// Earth rotation angle at `instant`, in radians.
    fn sidereal_time(&self, instant: DateTime<Utc>) -> f64;

    /// Convert an inertial position to the Earth-fixed frame.
    fn inertial_to_earth_fixed(&self, position: [f64; 3], sidereal: f64) -> [f64; 3] {
        rotate_to_earth_fixed(position, sidereal)
    }
}

// =============================================================================
// SGP4 adapter
// =============================================================================

/// SGP4/SDP4 state for one object.
#[derive(Debug, Clone)]
pub struct Sgp4Handle {
    constants: sgp4::Constants,
    /// Element epoch in minutes since the Unix epoch.
    epoch_minutes: f64,
}

impl Sgp4Handle {
    /// Element epoch in minutes since the Unix epoch.
    pub fn epoch_minutes(&self) -> f64 {
        self.epoch_minutes
    }
}

/// [`Propagator`] backed by the `sgp4` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self
    }
}

impl Propagator for Sgp4Propagator {
    type Handle = Sgp4Handle;

    fn build_handle(&self, line1: &str, line2: &str) -> Result<Sgp4Handle, PropagatorError> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PropagatorError::Parse(e.to_string()))?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| PropagatorError::Initialization(e.to_string()))?;
        let epoch_minutes = elements.datetime.and_utc().timestamp_millis() as f64 / 60_000.0;

        Ok(Sgp4Handle {
            constants,
            epoch_minutes,
        })
    }

    fn state_at(&self, handle: &Sgp4Handle, instant: DateTime<Utc>) -> StateVector {
        let minutes = instant.timestamp_millis() as f64 / 60_000.0 - handle.epoch_minutes;
        match handle.constants.propagate(sgp4::MinutesSinceEpoch(minutes)) {
            Ok(prediction) => StateVector::from_raw(prediction.position, prediction.velocity),
            Err(_) => StateVector::invalid(),
        }
    }

    fn sidereal_time(&self, instant: DateTime<Utc>) -> f64 {
        greenwich_mean_sidereal_time(instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference ISS set with valid checksums
    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_221_913_540, 104_000_000).unwrap()
    }

    #[test]
    fn test_state_vector_discards_non_finite() {
        let state = StateVector::from_raw([1.0, f64::NAN, 3.0], [1.0, 2.0, 3.0]);
        assert!(state.position.is_none());
        assert_eq!(state.velocity, Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_sgp4_builds_reference_handle() {
        let handle = Sgp4Propagator::new()
            .build_handle(ISS_LINE1, ISS_LINE2)
            .expect("reference set should parse");
        let expected = epoch().timestamp_millis() as f64 / 60_000.0;
        assert!((handle.epoch_minutes() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_sgp4_rejects_garbage() {
        let corrupted = ISS_LINE2.replace(" 51.6416", " ab.cdef");
        let err = Sgp4Propagator::new()
            .build_handle(ISS_LINE1, &corrupted)
            .unwrap_err();
        assert!(matches!(err, PropagatorError::Parse(_)));
    }

    #[test]
    fn test_sgp4_state_at_epoch_is_low_earth_orbit() {
        let propagator = Sgp4Propagator::new();
        let handle = propagator.build_handle(ISS_LINE1, ISS_LINE2).unwrap();
        let state = propagator.state_at(&handle, epoch());

        let [x, y, z] = state.position.expect("position at epoch");
        let radius = (x * x + y * y + z * z).sqrt();
        assert!((6600.0..6900.0).contains(&radius), "radius was {}", radius);

        let [vx, vy, vz] = state.velocity.expect("velocity at epoch");
        let speed = (vx * vx + vy * vy + vz * vz).sqrt();
        assert!((7.0..8.0).contains(&speed), "speed was {}", speed);
    }

    #[test]
    fn test_earth_fixed_conversion_preserves_radius() {
        let propagator = Sgp4Propagator::new();
        let handle = propagator.build_handle(ISS_LINE1, ISS_LINE2).unwrap();
        let instant = epoch();
        let eci = propagator.state_at(&handle, instant).position.unwrap();
        let ecf = propagator.inertial_to_earth_fixed(eci, propagator.sidereal_time(instant));

        let norm = |v: [f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((norm(eci) - norm(ecf)).abs() < 1e-6);
        assert_eq!(eci[2], ecf[2]);
    }
}
