//! Ephemeris builder: compact records → propagator handles.

use std::sync::Arc;

use tracing::{debug, info};

use super::interchange::format_record;
use super::propagator::Propagator;
use super::EphemerisError;
use crate::catalog::CompactRecord;

/// Slot-aligned propagator handles for a whole catalog.
///
/// `None` marks an absent handle: the record could not be turned into
/// propagator state. Absent slots are kept so slot indices stay aligned with
/// the catalog.
pub struct HandleSet<H> {
    handles: Vec<Option<H>>,
    failures: usize,
}

impl<H> HandleSet<H> {
    /// Number of slots (equals the number of input records).
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the set has no slots.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of records that produced an absent handle.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Whether the handle in `slot` is absent (or the slot does not exist).
    pub fn is_absent(&self, slot: usize) -> bool {
        !matches!(self.handles.get(slot), Some(Some(_)))
    }

    /// Slot-aligned handles.
    pub fn handles(&self) -> &[Option<H>] {
        &self.handles
    }

    /// Convert into a shared, immutable slice for the batch propagator.
    pub fn into_shared(self) -> Arc<[Option<H>]> {
        self.handles.into()
    }
}

/// Builds propagator handles from compact records.
pub struct EphemerisBuilder<P: Propagator> {
    propagator: Arc<P>,
}

impl<P: Propagator> Clone for EphemerisBuilder<P> {
    fn clone(&self) -> Self {
        Self {
            propagator: Arc::clone(&self.propagator),
        }
    }
}

impl<P: Propagator> EphemerisBuilder<P> {
    pub fn new(propagator: Arc<P>) -> Self {
        Self { propagator }
    }

    /// Build a handle, reporting why a record was rejected.
    pub fn try_build(&self, record: &CompactRecord) -> Result<P::Handle, EphemerisError> {
        let lines = format_record(record)?;
        let handle = self.propagator.build_handle(&lines.line1, &lines.line2)?;
        Ok(handle)
    }

    /// Build a handle, or `None` (absent) if the record is malformed.
    ///
    /// Never fails past this boundary.
    pub fn build(&self, record: &CompactRecord) -> Option<P::Handle> {
        match self.try_build(record) {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!(id = record.id, name = %record.name, error = %e, "Record produced absent handle");
                None
            }
        }
    }

    /// Build handles for every record in slot order.
    pub fn build_all(&self, records: &[CompactRecord]) -> HandleSet<P::Handle> {
        let mut failures = 0;
        let handles: Vec<Option<P::Handle>> = records
            .iter()
            .map(|record| {
                let handle = self.build(record);
                if handle.is_none() {
                    failures += 1;
                }
                handle
            })
            .collect();

        info!(
            records = records.len(),
            built = records.len() - failures,
            failed = failures,
            "Built propagator handles"
        );

        HandleSet { handles, failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::PropagatorError;
    use crate::test_support::{record, FakePropagator};

    fn builder(propagator: FakePropagator) -> EphemerisBuilder<FakePropagator> {
        EphemerisBuilder::new(Arc::new(propagator))
    }

    #[test]
    fn test_build_valid_record() {
        let builder = builder(FakePropagator::new());
        let handle = builder.build(&record(42, "SAT-42")).expect("handle");
        assert_eq!(handle.id, 42);
    }

    #[test]
    fn test_malformed_record_is_absent() {
        let builder = builder(FakePropagator::new());
        let mut bad = record(7, "BAD");
        bad.inclination_deg = 1000.0;
        assert!(builder.build(&bad).is_none());
    }

    #[test]
    fn test_non_finite_record_is_absent() {
        let builder = builder(FakePropagator::new());
        let mut bad = record(7, "BAD");
        bad.mean_anomaly_deg = f64::NAN;
        assert!(builder.build(&bad).is_none());
    }

    #[test]
    fn test_propagator_rejection_is_absent() {
        let builder = builder(FakePropagator::new().rejecting(9));
        assert!(matches!(
            builder.try_build(&record(9, "REJECTED")),
            Err(EphemerisError::Propagator(PropagatorError::Parse(_)))
        ));
        assert!(builder.build(&record(9, "REJECTED")).is_none());
    }

    #[test]
    fn test_build_all_keeps_slots_aligned() {
        let builder = builder(FakePropagator::new());
        let mut bad = record(2, "BAD");
        bad.eccentricity = 1.5;
        let records = vec![record(1, "A"), bad, record(3, "C")];

        let set = builder.build_all(&records);
        assert_eq!(set.len(), 3);
        assert_eq!(set.failures(), 1);
        assert!(!set.is_absent(0));
        assert!(set.is_absent(1));
        assert!(!set.is_absent(2));
        assert!(set.is_absent(3));
        assert_eq!(set.handles()[2].as_ref().map(|h| h.id), Some(3));
    }

    #[test]
    fn test_build_all_empty() {
        let set = builder(FakePropagator::new()).build_all(&[]);
        assert!(set.is_empty());
        assert_eq!(set.failures(), 0);
    }
}
