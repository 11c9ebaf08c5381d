//! Packed position buffer.

/// Components per slot.
pub const COMPONENTS: usize = 3;

/// Flat `3 × N` buffer of Earth-fixed positions in km, slot-aligned with the
/// catalog.
///
/// `(0, 0, 0)` or any NaN component is the sentinel for "no valid position
/// this tick". The buffer is deliberately not `Clone`: each batch produces a
/// fresh buffer that is moved, never copied, to its consumer.
#[derive(Debug, PartialEq)]
pub struct PositionBuffer {
    values: Vec<f32>,
}

impl PositionBuffer {
    /// A buffer of `object_count` sentinel slots.
    pub fn zeroed(object_count: usize) -> Self {
        Self {
            values: vec![0.0; object_count * COMPONENTS],
        }
    }

    /// Wrap raw packed values.
    ///
    /// No length check is made here; receivers validate the length against
    /// the known object count.
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of packed values (`3 × N` for a well-formed buffer).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of whole slots in the buffer.
    pub fn object_count(&self) -> usize {
        self.values.len() / COMPONENTS
    }

    /// Whether the buffer holds exactly `object_count` slots.
    pub fn matches_count(&self, object_count: usize) -> bool {
        self.values.len() == object_count * COMPONENTS
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// The raw triple stored for `slot`, sentinel included.
    pub fn get(&self, slot: usize) -> Option<[f32; 3]> {
        let start = slot.checked_mul(COMPONENTS)?;
        let end = start.checked_add(COMPONENTS)?;
        let v = self.values.get(start..end)?;
        Some([v[0], v[1], v[2]])
    }

    /// The position stored for `slot`, or `None` for a sentinel or missing slot.
    pub fn position(&self, slot: usize) -> Option<[f32; 3]> {
        self.get(slot).filter(|p| !is_sentinel(*p))
    }

    /// Iterate slots as raw triples.
    pub fn iter(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.values
            .chunks_exact(COMPONENTS)
            .map(|c| [c[0], c[1], c[2]])
    }

    /// Number of slots holding a valid (non-sentinel) position.
    pub fn valid_count(&self) -> usize {
        self.iter().filter(|p| !is_sentinel(*p)).count()
    }
}

/// Whether a position triple is the "no valid position" sentinel.
pub fn is_sentinel(position: [f32; 3]) -> bool {
    position == [0.0, 0.0, 0.0] || position.iter().any(|c| c.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_is_all_sentinel() {
        let buffer = PositionBuffer::zeroed(4);
        assert_eq!(buffer.len(), 12);
        assert_eq!(buffer.object_count(), 4);
        assert_eq!(buffer.valid_count(), 0);
        assert!(buffer.matches_count(4));
        assert!(!buffer.matches_count(3));
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_sentinel([0.0, 0.0, 0.0]));
        assert!(is_sentinel([1.0, f32::NAN, 2.0]));
        assert!(!is_sentinel([0.0, 0.0, 1.0]));
        assert!(!is_sentinel([6371.0, 0.0, 0.0]));
    }

    #[test]
    fn test_get_and_position() {
        let buffer = PositionBuffer::from_vec(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_eq!(buffer.get(0), Some([1.0, 2.0, 3.0]));
        assert_eq!(buffer.get(1), Some([0.0, 0.0, 0.0]));
        assert_eq!(buffer.position(1), None);
        assert_eq!(buffer.get(2), None);
        assert_eq!(buffer.get(usize::MAX), None);
    }

    #[test]
    fn test_partial_trailing_slot_ignored() {
        let buffer = PositionBuffer::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buffer.object_count(), 1);
        assert_eq!(buffer.iter().count(), 1);
        assert_eq!(buffer.get(1), None);
    }
}
