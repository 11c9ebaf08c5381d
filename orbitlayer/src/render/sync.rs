//! Applying position buffers and selection colors to a renderer.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, warn};

use super::frame::{orientation_towards_origin, FrameMapper};
use super::{InstanceRenderer, Palette, RenderError};
use crate::propagation::{is_sentinel, PositionBuffer};
use crate::selection::SelectionState;

/// Per-tick buffer → instance synchronization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderSync {
    mapper: FrameMapper,
    palette: Palette,
}

impl RenderSync {
    pub fn new(mapper: FrameMapper, palette: Palette) -> Self {
        Self { mapper, palette }
    }

    pub fn mapper(&self) -> &FrameMapper {
        &self.mapper
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Write every slot of `buffer` into `renderer` and recolor.
    ///
    /// Sentinel slots are hidden with zero scale at the origin. Returns the
    /// number of visible instances.
    pub fn apply<R: InstanceRenderer + ?Sized>(
        &self,
        buffer: &PositionBuffer,
        selection: &SelectionState,
        renderer: &mut R,
    ) -> Result<usize, RenderError> {
        let instances = renderer.instance_count();
        if !buffer.matches_count(instances) {
            return Err(RenderError::InstanceCountMismatch {
                buffer: buffer.object_count(),
                instances,
            });
        }

        let mut visible = 0;
        for (slot, raw) in buffer.iter().enumerate() {
            if is_sentinel(raw) {
                renderer.set_instance_transform(slot, Vector3::zeros(), UnitQuaternion::identity(), 0.0);
                continue;
            }
            let position = self.mapper.map(raw);
            let orientation = orientation_towards_origin(&position);
            renderer.set_instance_transform(slot, position, orientation, 1.0);
            visible += 1;
        }

        recolor(selection, &self.palette, renderer);

        if visible == 0 && instances > 0 {
            warn!(instances, "No instances visible after applying batch");
        } else {
            debug!(instances, visible, "Applied position buffer");
        }
        Ok(visible)
    }

    /// Visualization position of one slot, or `None` for a sentinel or
    /// out-of-range slot.
    pub fn visual_position(&self, buffer: &PositionBuffer, slot: usize) -> Option<Vector3<f32>> {
        buffer.position(slot).map(|p| self.mapper.map(p))
    }
}

/// Color every instance: hovered or selected get the highlight, the rest the
/// default color.
pub fn recolor<R: InstanceRenderer + ?Sized>(selection: &SelectionState, palette: &Palette, renderer: &mut R) {
    for slot in 0..renderer.instance_count() {
        let color = if selection.is_highlighted(slot) {
            palette.highlight
        } else {
            palette.default
        };
        renderer.set_instance_color(slot, color);
    }
    renderer.commit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, RecordingRenderer};

    fn buffer() -> PositionBuffer {
        PositionBuffer::from_vec(vec![
            6371.0, 0.0, 0.0, // visible
            0.0, 0.0, 0.0, // sentinel
            f32::NAN, 1.0, 1.0, // sentinel
        ])
    }

    #[test]
    fn test_sentinels_hidden_with_zero_scale() {
        let sync = RenderSync::default();
        let mut renderer = RecordingRenderer::new(3);

        let visible = sync.apply(&buffer(), &SelectionState::default(), &mut renderer).unwrap();
        assert_eq!(visible, 1);

        let hidden = renderer.transform(1).unwrap();
        assert_eq!(hidden.scale, 0.0);
        assert_eq!(hidden.position, Vector3::zeros());
        assert_eq!(renderer.transform(2).unwrap().scale, 0.0);
    }

    #[test]
    fn test_visible_slot_remapped_and_scaled() {
        let sync = RenderSync::default();
        let mut renderer = RecordingRenderer::new(3);
        sync.apply(&buffer(), &SelectionState::default(), &mut renderer).unwrap();

        let t = renderer.transform(0).unwrap();
        assert_eq!(t.scale, 1.0);
        assert!((t.position - Vector3::new(0.0, 0.0, 100.0)).norm() < 1e-3);
    }

    #[test]
    fn test_hidden_slot_reappears_on_next_batch() {
        let sync = RenderSync::default();
        let mut renderer = RecordingRenderer::new(1);
        let selection = SelectionState::default();

        sync.apply(&PositionBuffer::zeroed(1), &selection, &mut renderer).unwrap();
        assert_eq!(renderer.visible_count(), 0);

        let next = PositionBuffer::from_vec(vec![7000.0, 0.0, 0.0]);
        assert_eq!(sync.apply(&next, &selection, &mut renderer).unwrap(), 1);
    }

    #[test]
    fn test_recolor_highlights_selected_and_hovered() {
        let sync = RenderSync::default();
        let mut renderer = RecordingRenderer::new(3);
        let selection = SelectionState {
            hovered: Some(0),
            selected: Some(2),
        };
        sync.apply(&buffer(), &selection, &mut renderer).unwrap();

        assert_eq!(renderer.color(0), Some(Color::GREEN));
        assert_eq!(renderer.color(1), Some(Color::WHITE));
        assert_eq!(renderer.color(2), Some(Color::GREEN));
        assert_eq!(renderer.commits(), 1);
    }

    #[test]
    fn test_count_mismatch_rejected_without_writes() {
        let sync = RenderSync::default();
        let mut renderer = RecordingRenderer::new(2);
        let err = sync
            .apply(&buffer(), &SelectionState::default(), &mut renderer)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::InstanceCountMismatch { buffer: 3, instances: 2 }
        ));
        assert_eq!(renderer.color_writes(), 0);
    }

    #[test]
    fn test_visual_position() {
        let sync = RenderSync::default();
        let b = buffer();
        let p = sync.visual_position(&b, 0).unwrap();
        assert!((p.z - 100.0).abs() < 1e-3);
        assert_eq!(sync.visual_position(&b, 1), None);
        assert_eq!(sync.visual_position(&b, 9), None);
    }
}
