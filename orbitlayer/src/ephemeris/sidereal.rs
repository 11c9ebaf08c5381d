//! Sidereal time and inertial → Earth-fixed rotation.

use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

/// Unix time of the J2000 epoch (2000-01-01T12:00:00Z).
const J2000_UNIX_SECONDS: f64 = 946_728_000.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const GMST_BASE_DEG: f64 = 280.460_618_37;
pub const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
pub const GMST_CORRECTION: f64 = 0.000_387_933;

/// Greenwich mean sidereal time in radians, normalized to `[0, 2π)`.
pub fn greenwich_mean_sidereal_time(instant: DateTime<Utc>) -> f64 {
    let unix_seconds = instant.timestamp_millis() as f64 / 1000.0;
    let days = (unix_seconds - J2000_UNIX_SECONDS) / SECONDS_PER_DAY;
    let centuries = days / DAYS_PER_JULIAN_CENTURY;
    let degrees = GMST_BASE_DEG + GMST_ROTATION_PER_DAY * days + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians().rem_euclid(TAU)
}

/// Rotate an inertial position about the polar axis by the sidereal angle.
pub fn rotate_to_earth_fixed(position: [f64; 3], sidereal: f64) -> [f64; 3] {
    let (sin, cos) = sidereal.sin_cos();
    let [x, y, z] = position;
    [x * cos + y * sin, -x * sin + y * cos, z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn at(unix: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(unix, 0).unwrap()
    }

    #[test]
    fn test_gmst_at_j2000() {
        let gmst = greenwich_mean_sidereal_time(at(946_728_000));
        assert!((gmst - GMST_BASE_DEG.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_gmst_in_range() {
        for unix in [0, 1_000_000_000, 1_700_000_000, 2_000_000_000] {
            let gmst = greenwich_mean_sidereal_time(at(unix));
            assert!((0.0..TAU).contains(&gmst), "gmst {} out of range", gmst);
        }
    }

    #[test]
    fn test_gmst_advances_about_one_degree_per_day() {
        let a = greenwich_mean_sidereal_time(at(1_700_000_000));
        let b = greenwich_mean_sidereal_time(at(1_700_000_000 + 86_400));
        let delta = (b - a).rem_euclid(TAU).to_degrees();
        assert!((delta - 0.9856).abs() < 1e-3, "delta was {}", delta);
    }

    #[test]
    fn test_rotation_zero_angle_is_identity() {
        assert_eq!(rotate_to_earth_fixed([1.0, 2.0, 3.0], 0.0), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let [x, y, z] = rotate_to_earth_fixed([1.0, 0.0, 5.0], FRAC_PI_2);
        assert!(x.abs() < 1e-12);
        assert!((y + 1.0).abs() < 1e-12);
        assert_eq!(z, 5.0);
    }
}
