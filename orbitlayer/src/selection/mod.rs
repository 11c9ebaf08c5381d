//! Picking and selection.
//!
//! ```text
//!             set_hovered(Some k)             set_selected(Some k)
//!  hovered: None ◄──────────────► Some(k)    selected: None ◄──────► Some(k)
//!             set_hovered(None)               set_selected(None)
//! ```
//!
//! Hover and selection are independent of the buffer lifecycle: a buffer
//! swap never touches them, and both survive a slot going invalid.

use tracing::{debug, trace};

use crate::render::{recolor, InstanceRenderer, Palette, Ray};

/// Hovered and selected slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

impl SelectionState {
    /// Whether `slot` should be drawn with the highlight color.
    pub fn is_highlighted(&self, slot: usize) -> bool {
        self.hovered == Some(slot) || self.selected == Some(slot)
    }
}

/// Owns the [`SelectionState`] and recolors the renderer on change.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    state: SelectionState,
    palette: Palette,
}

impl Selection {
    pub fn new(palette: Palette) -> Self {
        Self {
            state: SelectionState::default(),
            palette,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        self.state.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected
    }

    /// Resolve a pointer ray to a slot. Pure query; state is untouched.
    pub fn hit_test<R: InstanceRenderer + ?Sized>(&self, ray: &Ray, renderer: &R) -> Option<usize> {
        let count = renderer.instance_count();
        match renderer.hit_test_instances(ray) {
            Some(slot) if slot < count => Some(slot),
            Some(slot) => {
                debug!(slot, count, "Renderer returned out-of-range hit, ignored");
                None
            }
            None => None,
        }
    }

    /// Update the hovered slot. Recolors and returns true only on change.
    pub fn set_hovered<R: InstanceRenderer + ?Sized>(&mut self, slot: Option<usize>, renderer: &mut R) -> bool {
        if self.state.hovered == slot {
            return false;
        }
        trace!(?slot, "Hover changed");
        self.state.hovered = slot;
        recolor(&self.state, &self.palette, renderer);
        true
    }

    /// Set or clear the selected slot, always recoloring.
    pub fn set_selected<R: InstanceRenderer + ?Sized>(&mut self, slot: Option<usize>, renderer: &mut R) {
        debug!(?slot, "Selection set");
        self.state.selected = slot;
        recolor(&self.state, &self.palette, renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, RecordingRenderer};
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    /// Renderer whose hit test always returns a fixed slot.
    struct FixedHit {
        inner: RecordingRenderer,
        hit: Option<usize>,
    }

    impl InstanceRenderer for FixedHit {
        fn instance_count(&self) -> usize {
            self.inner.instance_count()
        }
        fn set_instance_transform(&mut self, slot: usize, p: Vector3<f32>, q: UnitQuaternion<f32>, s: f32) {
            self.inner.set_instance_transform(slot, p, q, s)
        }
        fn set_instance_color(&mut self, slot: usize, color: Color) {
            self.inner.set_instance_color(slot, color)
        }
        fn hit_test_instances(&self, _ray: &Ray) -> Option<usize> {
            self.hit
        }
    }

    fn ray() -> Ray {
        Ray::new(Point3::origin(), Vector3::z())
    }

    #[test]
    fn test_hit_test_rejects_out_of_range() {
        let selection = Selection::default();
        let renderer = FixedHit {
            inner: RecordingRenderer::new(3),
            hit: Some(3),
        };
        assert_eq!(selection.hit_test(&ray(), &renderer), None);

        let renderer = FixedHit {
            inner: RecordingRenderer::new(3),
            hit: Some(2),
        };
        assert_eq!(selection.hit_test(&ray(), &renderer), Some(2));
    }

    #[test]
    fn test_hit_test_does_not_change_state() {
        let selection = Selection::default();
        let renderer = FixedHit {
            inner: RecordingRenderer::new(3),
            hit: Some(1),
        };
        selection.hit_test(&ray(), &renderer);
        assert_eq!(*selection.state(), SelectionState::default());
    }

    #[test]
    fn test_set_hovered_recolors_only_on_change() {
        let mut selection = Selection::default();
        let mut renderer = RecordingRenderer::new(4);

        assert!(selection.set_hovered(Some(1), &mut renderer));
        let writes = renderer.color_writes();
        assert_eq!(renderer.color(1), Some(Color::GREEN));

        assert!(!selection.set_hovered(Some(1), &mut renderer));
        assert_eq!(renderer.color_writes(), writes);

        assert!(selection.set_hovered(None, &mut renderer));
        assert_eq!(renderer.color(1), Some(Color::WHITE));
    }

    #[test]
    fn test_set_selected_idempotent() {
        let mut selection = Selection::default();
        let mut a = RecordingRenderer::new(4);
        let mut b = RecordingRenderer::new(4);

        selection.set_selected(Some(2), &mut a);
        let first = *selection.state();
        selection.set_selected(Some(2), &mut b);

        assert_eq!(*selection.state(), first);
        for slot in 0..4 {
            assert_eq!(a.color(slot), b.color(slot));
        }
        assert_eq!(b.color(2), Some(Color::GREEN));
    }

    #[test]
    fn test_clear_selection() {
        let mut selection = Selection::default();
        let mut renderer = RecordingRenderer::new(2);
        selection.set_selected(Some(0), &mut renderer);
        selection.set_selected(None, &mut renderer);
        assert_eq!(selection.selected(), None);
        assert_eq!(renderer.color(0), Some(Color::WHITE));
    }

    #[test]
    fn test_hover_and_selection_independent() {
        let mut selection = Selection::default();
        let mut renderer = RecordingRenderer::new(3);
        selection.set_selected(Some(0), &mut renderer);
        selection.set_hovered(Some(1), &mut renderer);
        selection.set_hovered(None, &mut renderer);

        assert_eq!(selection.selected(), Some(0));
        assert_eq!(renderer.color(0), Some(Color::GREEN));
        assert_eq!(renderer.color(1), Some(Color::WHITE));
    }
}
