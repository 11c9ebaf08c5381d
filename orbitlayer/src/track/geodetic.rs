//! Earth-fixed to geodetic conversion on the WGS-84 ellipsoid.

/// WGS-84 equatorial radius in km.
pub const WGS84_A: f64 = 6378.137;

/// WGS-84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Geodetic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude_deg: f64,
    /// In `(-180, 180]`.
    pub longitude_deg: f64,
    /// Height above the ellipsoid in km.
    pub altitude_km: f64,
}

/// Convert an Earth-fixed position in km to geodetic coordinates.
///
/// Iterates the latitude to a fixed point; converges in a handful of steps
/// for any orbit above the surface.
pub fn geodetic_from_earth_fixed([x, y, z]: [f64; 3]) -> Geodetic {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let r = (x * x + y * y).sqrt();
    let longitude = y.atan2(x);

    let mut latitude = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..20 {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + WGS84_A * c * e2 * sin_lat).atan2(r);
        if (next - latitude).abs() < 1e-12 {
            latitude = next;
            break;
        }
        latitude = next;
    }

    let altitude = if latitude.cos().abs() > 1e-9 {
        r / latitude.cos() - WGS84_A * c
    } else {
        // At the poles the horizontal distance carries no information
        z.abs() - WGS84_A * (1.0 - e2).sqrt()
    };

    Geodetic {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: altitude,
    }
}
