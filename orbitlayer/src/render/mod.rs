//! Frame/render synchronization.
//!
//! Maps Earth-fixed position buffers into the visualization frame and pushes
//! per-instance transforms and colors into an [`InstanceRenderer`].
//!
//! ```text
//! PositionBuffer (km, Earth-fixed)
//!        │
//!        ▼  FrameMapper: X←Y, Y←Z, Z←X, × globe_radius / body_radius_km
//! instance transforms ──► InstanceRenderer ◄── instance colors (Palette + SelectionState)
//! ```
//!
//! The renderer itself (scene graph, meshes, GPU) is an external collaborator.
//! [`RecordingRenderer`] is an in-memory implementation for headless runs.

mod frame;
mod recording;
mod sync;

pub use frame::{orientation_towards_origin, FrameMapper, DEFAULT_BODY_RADIUS_KM, DEFAULT_GLOBE_RADIUS};
pub use recording::{InstanceTransform, RecordingRenderer, DEFAULT_PICK_RADIUS};
pub use sync::{recolor, RenderSync};

use nalgebra::{Point3, UnitQuaternion, Vector3};
use thiserror::Error;

/// Linear RGB color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Instance colors for the two selection states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Color of every instance that is neither hovered nor selected.
    pub default: Color,
    /// Color of the hovered and selected instances.
    pub highlight: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            default: Color::WHITE,
            highlight: Color::GREEN,
        }
    }
}

/// A pointer ray in visualization coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }
}

/// Instanced renderer contract.
///
/// One instance per catalog slot. Implementations must accept every slot in
/// `0..instance_count()`; slots outside that range are never passed in.
pub trait InstanceRenderer {
    /// Number of instances, equal to the catalog length.
    fn instance_count(&self) -> usize;

    fn set_instance_transform(
        &mut self,
        slot: usize,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
        scale: f32,
    );

    fn set_instance_color(&mut self, slot: usize, color: Color);

    /// The nearest instance hit by `ray`, if any.
    fn hit_test_instances(&self, ray: &Ray) -> Option<usize>;

    /// Called once after a full transform or color pass.
    fn commit(&mut self) {}
}

/// Errors raised while applying a buffer to a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("buffer holds {buffer} slots but renderer has {instances} instances")]
    InstanceCountMismatch { buffer: usize, instances: usize },
}
