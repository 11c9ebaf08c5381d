//! Orbit path sampling and live summaries for a single object.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::geodetic::{geodetic_from_earth_fixed, Geodetic};
use crate::catalog::CompactRecord;
use crate::ephemeris::{EphemerisBuilder, Propagator};

/// Default number of intervals along one orbit.
pub const DEFAULT_TRACK_SAMPLES: usize = 100;

/// One sampled point of an orbit path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub instant: DateTime<Utc>,
    /// Earth-fixed position in km.
    pub earth_fixed: [f64; 3],
    pub geodetic: Geodetic,
}

/// Live state of one object at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub id: i64,
    pub name: String,
    pub instant: DateTime<Utc>,
    /// `1440 / mean motion`, when the mean motion is positive.
    pub period_minutes: Option<f64>,
    /// `None` when the object has no handle or propagation failed.
    pub geodetic: Option<Geodetic>,
    /// Inertial speed in km/s.
    pub speed_km_s: Option<f64>,
}

/// Computes single-object insight off the batch path.
///
/// Builds its own handle per call, so it never touches the handles owned by
/// the propagation worker.
pub struct OrbitTracker<P: Propagator> {
    builder: EphemerisBuilder<P>,
    propagator: Arc<P>,
}

impl<P: Propagator> OrbitTracker<P> {
    pub fn new(propagator: Arc<P>) -> Self {
        Self {
            builder: EphemerisBuilder::new(Arc::clone(&propagator)),
            propagator,
        }
    }

    /// Sample one orbital period starting at `start`.
    ///
    /// Produces up to `samples + 1` points, both ends included. Instants at
    /// which propagation fails are skipped. An object without a handle or
    /// without a positive mean motion yields no points.
    pub fn orbit_path(&self, record: &CompactRecord, start: DateTime<Utc>, samples: usize) -> Vec<TrackPoint> {
        let Some(period) = record.period_minutes() else {
            return Vec::new();
        };
        let Some(handle) = self.builder.build(record) else {
            return Vec::new();
        };
        let samples = samples.max(1);
        let step_micros = period * 60e6 / samples as f64;

        let points: Vec<TrackPoint> = (0..=samples)
            .filter_map(|i| {
                let offset = TimeDelta::microseconds((step_micros * i as f64).round() as i64);
                let instant = start.checked_add_signed(offset)?;
                self.point_at(&handle, instant)
            })
            .collect();

        debug!(
            id = record.id,
            samples,
            points = points.len(),
            period_minutes = period,
            "Sampled orbit path"
        );
        points
    }

    /// Position, period and speed of `record` at `instant`.
    pub fn summary(&self, record: &CompactRecord, instant: DateTime<Utc>) -> ObjectSummary {
        let state = self
            .builder
            .build(record)
            .map(|handle| self.propagator.state_at(&handle, instant));

        let geodetic = state.as_ref().and_then(|s| s.position).map(|inertial| {
            let sidereal = self.propagator.sidereal_time(instant);
            geodetic_from_earth_fixed(self.propagator.inertial_to_earth_fixed(inertial, sidereal))
        });
        let speed_km_s = state
            .as_ref()
            .and_then(|s| s.velocity)
            .map(|[vx, vy, vz]| (vx * vx + vy * vy + vz * vz).sqrt());

        ObjectSummary {
            id: record.id,
            name: record.name.clone(),
            instant,
            period_minutes: record.period_minutes(),
            geodetic,
            speed_km_s,
        }
    }

    fn point_at(&self, handle: &P::Handle, instant: DateTime<Utc>) -> Option<TrackPoint> {
        let inertial = self.propagator.state_at(handle, instant).position?;
        let sidereal = self.propagator.sidereal_time(instant);
        let earth_fixed = self.propagator.inertial_to_earth_fixed(inertial, sidereal);
        Some(TrackPoint {
            instant,
            earth_fixed,
            geodetic: geodetic_from_earth_fixed(earth_fixed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{instant, record, FakePropagator};

    #[test]
    fn test_track_spans_one_period() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new()));
        let r = record(7, "SAT");
        let start = instant(1_700_000_000);

        let points = tracker.orbit_path(&r, start, 10);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].instant, start);

        let period = r.period_minutes().unwrap();
        let span = (points[10].instant - start).num_microseconds().unwrap() as f64 / 60e6;
        assert!((span - period).abs() < 1e-6, "span {} vs period {}", span, period);
    }

    #[test]
    fn test_absent_object_has_no_track() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new().rejecting(7)));
        assert!(tracker
            .orbit_path(&record(7, "SAT"), instant(0), 10)
            .is_empty());
    }

    #[test]
    fn test_failed_instants_skipped() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new().failing(7)));
        assert!(tracker
            .orbit_path(&record(7, "SAT"), instant(0), 10)
            .is_empty());
    }

    #[test]
    fn test_zero_mean_motion_has_no_track() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new()));
        let mut r = record(7, "SAT");
        r.mean_motion_rev_per_day = 0.0;
        assert!(tracker.orbit_path(&r, instant(0), 10).is_empty());
    }

    #[test]
    fn test_summary_reports_position_and_speed() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new()));
        let summary = tracker.summary(&record(0, "SAT"), instant(1_700_000_000));

        assert_eq!(summary.name, "SAT");
        let g = summary.geodetic.unwrap();
        // Fake inertial position (7000, 0, 0) with zero sidereal angle
        assert!(g.latitude_deg.abs() < 1e-9);
        assert!(g.longitude_deg.abs() < 1e-9);
        assert!((g.altitude_km - (7000.0 - 6378.137)).abs() < 1e-6);
        assert!((summary.speed_km_s.unwrap() - 7.5).abs() < 1e-12);
        assert!((summary.period_minutes.unwrap() - 1440.0 / 15.5).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_absent_object() {
        let tracker = OrbitTracker::new(Arc::new(FakePropagator::new().rejecting(3)));
        let summary = tracker.summary(&record(3, "GONE"), instant(0));
        assert_eq!(summary.geodetic, None);
        assert_eq!(summary.speed_km_s, None);
        assert!(summary.period_minutes.is_some());
    }
}
