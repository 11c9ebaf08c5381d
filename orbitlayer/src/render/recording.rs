//! In-memory instance renderer.

use nalgebra::{UnitQuaternion, Vector3};

use super::{Color, InstanceRenderer, Ray};

/// Pick sphere radius in visualization units at instance scale 1.
pub const DEFAULT_PICK_RADIUS: f32 = 1.0;

/// Last transform written to one instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub scale: f32,
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: 0.0,
        }
    }
}

impl InstanceTransform {
    pub fn is_visible(&self) -> bool {
        self.scale > 0.0
    }
}

/// Records every transform and color; hit-tests against per-instance spheres.
///
/// Instances start hidden (scale 0) and white.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    transforms: Vec<InstanceTransform>,
    colors: Vec<Color>,
    pick_radius: f32,
    commits: usize,
    color_writes: usize,
}

impl RecordingRenderer {
    pub fn new(instance_count: usize) -> Self {
        Self {
            transforms: vec![InstanceTransform::default(); instance_count],
            colors: vec![Color::WHITE; instance_count],
            pick_radius: DEFAULT_PICK_RADIUS,
            commits: 0,
            color_writes: 0,
        }
    }

    pub fn with_pick_radius(mut self, radius: f32) -> Self {
        self.pick_radius = radius;
        self
    }

    pub fn transform(&self, slot: usize) -> Option<&InstanceTransform> {
        self.transforms.get(slot)
    }

    pub fn color(&self, slot: usize) -> Option<Color> {
        self.colors.get(slot).copied()
    }

    pub fn visible_count(&self) -> usize {
        self.transforms.iter().filter(|t| t.is_visible()).count()
    }

    /// Number of `commit` calls so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Number of `set_instance_color` calls so far.
    pub fn color_writes(&self) -> usize {
        self.color_writes
    }
}

impl InstanceRenderer for RecordingRenderer {
    fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    fn set_instance_transform(
        &mut self,
        slot: usize,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
        scale: f32,
    ) {
        if let Some(t) = self.transforms.get_mut(slot) {
            *t = InstanceTransform {
                position,
                orientation,
                scale,
            };
        }
    }

    fn set_instance_color(&mut self, slot: usize, color: Color) {
        if let Some(c) = self.colors.get_mut(slot) {
            *c = color;
            self.color_writes += 1;
        }
    }

    fn hit_test_instances(&self, ray: &Ray) -> Option<usize> {
        let length = ray.direction.norm();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        let direction = ray.direction / length;

        let mut nearest: Option<(usize, f32)> = None;
        for (slot, t) in self.transforms.iter().enumerate() {
            if !t.is_visible() {
                continue;
            }
            let radius = self.pick_radius * t.scale;
            let to_center = t.position - ray.origin.coords;
            let along = to_center.dot(&direction);
            let miss_sq = to_center.norm_squared() - along * along;
            let radius_sq = radius * radius;
            if miss_sq > radius_sq {
                continue;
            }
            let entry = along - (radius_sq - miss_sq).sqrt();
            let distance = if entry >= 0.0 { entry } else { along + (radius_sq - miss_sq).sqrt() };
            if distance < 0.0 {
                continue;
            }
            if nearest.map_or(true, |(_, d)| distance < d) {
                nearest = Some((slot, distance));
            }
        }
        nearest.map(|(slot, _)| slot)
    }

    fn commit(&mut self) {
        self.commits += 1;
    }
}
