//! Earth-fixed to visualization frame mapping.

use nalgebra::{UnitQuaternion, Vector3};

/// Radius of the rendered globe in visualization units.
pub const DEFAULT_GLOBE_RADIUS: f32 = 100.0;

/// Mean Earth radius in kilometres.
pub const DEFAULT_BODY_RADIUS_KM: f32 = 6371.0;

/// Converts Earth-fixed kilometres into visualization coordinates.
///
/// The visualization frame is y-up: visualization X takes the Earth-fixed Y
/// component, Y takes Z (the polar axis) and Z takes X. All components are
/// scaled by `globe_radius / body_radius_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMapper {
    scale: f32,
}

impl Default for FrameMapper {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBE_RADIUS, DEFAULT_BODY_RADIUS_KM)
    }
}

impl FrameMapper {
    pub fn new(globe_radius: f32, body_radius_km: f32) -> Self {
        Self {
            scale: globe_radius / body_radius_km,
        }
    }

    /// Visualization units per kilometre.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn map(&self, [x, y, z]: [f32; 3]) -> Vector3<f32> {
        Vector3::new(y, z, x) * self.scale
    }
}

/// Rotation that points an instance's forward (+Z) axis at the frame origin.
pub fn orientation_towards_origin(position: &Vector3<f32>) -> UnitQuaternion<f32> {
    let towards = -position;
    if towards.norm_squared() == 0.0 {
        return UnitQuaternion::identity();
    }

    // face_towards degenerates when the direction is parallel to `up`
    let up = if towards.cross(&Vector3::y()).norm_squared() > 1e-12 * towards.norm_squared() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    UnitQuaternion::face_towards(&towards, &up)
}
