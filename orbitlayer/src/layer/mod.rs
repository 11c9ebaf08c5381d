//! Interactive-context facade.
//!
//! [`SatelliteLayer`] composes everything the interactive context owns and
//! drives it once per tick:
//!
//! ```text
//! tick(wall_elapsed)
//!   1. clock.advance            simulated instant for this tick
//!   2. controller.poll          Ready / UpdateComplete drained, never blocks
//!   3. sync.apply               new buffer → instance transforms + colors
//!   4. controller.request_update(now)   dropped while a batch is in flight
//! ```
//!
//! Pointer input goes through [`SatelliteLayer::pointer_moved`] and
//! [`SatelliteLayer::clicked`], which only touch selection state and colors.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CompactRecord};
use crate::clock::SimulationClock;
use crate::ephemeris::Propagator;
use crate::pipeline::{PipelineController, PipelineError, PipelineState};
use crate::render::{InstanceRenderer, Ray, RenderSync};
use crate::selection::Selection;
use crate::track::{ObjectSummary, OrbitTracker, TrackPoint};

/// Errors raised by the layer.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The renderer was not sized to the catalog.
    #[error("renderer has {instances} instances but catalog has {objects} objects")]
    InstanceCountMismatch { instances: usize, objects: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// What one [`SatelliteLayer::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub instant: DateTime<Utc>,
    /// A new buffer was applied to the renderer.
    pub applied: bool,
    /// Visible instances after applying, when `applied`.
    pub visible: Option<usize>,
    /// An update request was sent this tick.
    pub dispatched: bool,
}

/// Per-tick driver for catalog, pipeline, selection and renderer.
pub struct SatelliteLayer<R: InstanceRenderer> {
    catalog: Catalog,
    controller: PipelineController,
    selection: Selection,
    sync: RenderSync,
    renderer: R,
    clock: SimulationClock,
}

impl<R: InstanceRenderer> SatelliteLayer<R> {
    /// Compose a layer. The renderer must hold exactly one instance per
    /// catalog slot.
    pub fn new(
        catalog: Catalog,
        controller: PipelineController,
        renderer: R,
        sync: RenderSync,
        clock: SimulationClock,
    ) -> Result<Self, LayerError> {
        if renderer.instance_count() != catalog.len() {
            return Err(LayerError::InstanceCountMismatch {
                instances: renderer.instance_count(),
                objects: catalog.len(),
            });
        }

        Ok(Self {
            selection: Selection::new(*sync.palette()),
            catalog,
            controller,
            sync,
            renderer,
            clock,
        })
    }

    /// Send the catalog to the worker.
    pub fn start(&mut self) -> Result<(), LayerError> {
        self.controller.init(self.catalog.records().to_vec())?;
        info!(objects = self.catalog.len(), "Satellite layer started");
        Ok(())
    }

    /// Advance one interactive tick.
    pub fn tick(&mut self, wall_elapsed: std::time::Duration) -> TickReport {
        let instant = self.clock.advance(wall_elapsed);
        let outcome = self.controller.poll();

        if outcome.became_ready {
            let reported = self.controller.object_count().unwrap_or_default();
            if reported != self.catalog.len() {
                warn!(
                    reported,
                    catalog = self.catalog.len(),
                    "Worker object count differs from catalog"
                );
            }
        }

        let mut visible = None;
        if outcome.buffer_updated {
            if let Some(buffer) = self.controller.buffer() {
                match self.sync.apply(buffer, self.selection.state(), &mut self.renderer) {
                    Ok(count) => visible = Some(count),
                    Err(e) => error!(error = %e, "Position buffer not applied"),
                }
            }
        }

        let dispatched = self.controller.request_update(instant);
        TickReport {
            instant,
            applied: visible.is_some(),
            visible,
            dispatched,
        }
    }

    /// Hover whatever `ray` hits. Returns true when the hover changed.
    pub fn pointer_moved(&mut self, ray: &Ray) -> bool {
        let hit = self.selection.hit_test(ray, &self.renderer);
        self.selection.set_hovered(hit, &mut self.renderer)
    }

    /// Select whatever `ray` hits; a miss clears the selection.
    pub fn clicked(&mut self, ray: &Ray) -> Option<usize> {
        let hit = self.selection.hit_test(ray, &self.renderer);
        self.select(hit);
        hit
    }

    /// Select `slot` directly. Out-of-range slots clear the selection.
    pub fn select(&mut self, slot: Option<usize>) {
        let slot = slot.filter(|&s| s < self.catalog.len());
        self.selection.set_selected(slot, &mut self.renderer);
        if let Some(record) = slot.and_then(|s| self.catalog.lookup(s)) {
            debug!(id = record.id, name = %record.name, "Object selected");
        }
    }

    /// Find by id or name and select the first match.
    pub fn search_and_select(&mut self, query: &str) -> Option<usize> {
        let slot = self.catalog.search_by_id_or_name(query);
        if slot.is_some() {
            self.select(slot);
        } else {
            debug!(query, "Search found nothing");
        }
        slot
    }

    pub fn selected_record(&self) -> Option<&CompactRecord> {
        self.selection.selected().and_then(|s| self.catalog.lookup(s))
    }

    /// Visualization position of the selected object in the current buffer.
    pub fn focus_target(&self) -> Option<Vector3<f32>> {
        let slot = self.selection.selected()?;
        let buffer = self.controller.buffer()?;
        self.sync.visual_position(buffer, slot)
    }

    /// Live summary of the selected object at the current simulated instant.
    pub fn selected_summary<P: Propagator>(&self, tracker: &OrbitTracker<P>) -> Option<ObjectSummary> {
        self.selected_record()
            .map(|record| tracker.summary(record, self.clock.now()))
    }

    /// One period of the selected object's orbit from the current instant.
    pub fn selected_track<P: Propagator>(&self, tracker: &OrbitTracker<P>, samples: usize) -> Vec<TrackPoint> {
        self.selected_record()
            .map(|record| tracker.orbit_path(record, self.clock.now(), samples))
            .unwrap_or_default()
    }

    pub fn is_ready(&self) -> bool {
        self.controller.state() != PipelineState::Uninitialized
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn controller(&self) -> &PipelineController {
        &self.controller
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Stop the background worker.
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}
