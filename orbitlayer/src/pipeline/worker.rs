//! Background computation context.
//!
//! The [`PropagationWorker`] owns the ephemeris builder, the handle set and
//! the batch propagator. It consumes [`PipelineMessage`]s strictly one at a
//! time in arrival order: CPU-bound work runs on the blocking pool and is
//! awaited before the next message is taken, so the context behaves as a
//! single sequential thread of work.
//!
//! # Example
//!
//! ```ignore
//! use orbitlayer::pipeline::PropagationWorker;
//!
//! let (worker, mut controller) = PropagationWorker::new(propagator, config, metrics);
//! runtime.spawn(worker.run());
//!
//! controller.init(catalog.records().to_vec())?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::controller::PipelineController;
use super::message::PipelineMessage;
use crate::catalog::CompactRecord;
use crate::ephemeris::{EphemerisBuilder, Propagator};
use crate::propagation::{BatchPropagator, PositionBuffer, PropagationConfig};
use crate::telemetry::PipelineMetrics;

/// The background propagation worker.
pub struct PropagationWorker<P: Propagator> {
    builder: EphemerisBuilder<P>,
    batch: Arc<BatchPropagator<P>>,
    handles: Option<Arc<[Option<P::Handle>]>>,
    inbox: mpsc::UnboundedReceiver<PipelineMessage>,
    outbox: mpsc::UnboundedSender<PipelineMessage>,
    metrics: Arc<PipelineMetrics>,
    shutdown: CancellationToken,
}

impl<P: Propagator> PropagationWorker<P> {
    /// Create a worker and the controller that talks to it.
    pub fn new(
        propagator: Arc<P>,
        config: PropagationConfig,
        metrics: Arc<PipelineMetrics>,
    ) -> (Self, PipelineController) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let worker = Self {
            builder: EphemerisBuilder::new(Arc::clone(&propagator)),
            batch: Arc::new(BatchPropagator::new(propagator, config)),
            handles: None,
            inbox: request_rx,
            outbox: event_tx,
            metrics: Arc::clone(&metrics),
            shutdown: shutdown.clone(),
        };

        let controller = PipelineController::new(request_tx, event_rx, metrics, shutdown);
        (worker, controller)
    }

    /// Process messages until shutdown or until the controller is dropped.
    pub async fn run(mut self) {
        info!("Propagation worker starting");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!("Propagation worker shutting down");
                    break;
                }

                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        debug!("Controller dropped, propagation worker exiting");
                        break;
                    };
                    if !self.handle(message).await {
                        debug!("Controller gone, propagation worker exiting");
                        break;
                    }
                }
            }
        }

        info!("Propagation worker stopped");
    }

    /// Handle one message. Returns false once the reply channel is closed.
    async fn handle(&mut self, message: PipelineMessage) -> bool {
        match message {
            PipelineMessage::Init(records) => self.initialize(records).await,
            PipelineMessage::UpdateRequest { instant } => self.update(instant).await,
            other @ (PipelineMessage::Ready { .. } | PipelineMessage::UpdateComplete { .. }) => {
                warn!(kind = other.kind(), "Unexpected message on worker inbox, dropped");
                self.metrics.protocol_violation();
                true
            }
        }
    }

    async fn initialize(&mut self, records: Vec<CompactRecord>) -> bool {
        if self.handles.is_some() {
            warn!(records = records.len(), "Worker already initialized, init ignored");
            self.metrics.protocol_violation();
            return true;
        }

        let count = records.len();
        let builder = self.builder.clone();
        let handles = match tokio::task::spawn_blocking(move || builder.build_all(&records)).await {
            Ok(set) => {
                self.metrics.handles_built(set.len(), set.failures());
                set.into_shared()
            }
            Err(e) => {
                warn!(error = %e, "Handle construction panicked, all slots absent");
                self.metrics.handles_built(count, count);
                let absent: Vec<Option<P::Handle>> = (0..count).map(|_| None).collect();
                absent.into()
            }
        };

        self.handles = Some(handles);
        self.outbox
            .send(PipelineMessage::Ready { count })
            .is_ok()
    }

    async fn update(&mut self, instant: DateTime<Utc>) -> bool {
        let Some(handles) = self.handles.as_ref().map(Arc::clone) else {
            warn!(%instant, "Update requested before init, dropped");
            self.metrics.protocol_violation();
            return true;
        };

        let count = handles.len();
        let batch = Arc::clone(&self.batch);
        let buffer = match tokio::task::spawn_blocking(move || batch.propagate_with_stats(&handles, instant))
            .await
        {
            Ok((buffer, stats)) => {
                self.metrics.batch_propagated(&stats);
                buffer
            }
            Err(e) => {
                // Still answer so the controller's pending flag clears
                warn!(error = %e, "Batch panicked, replying with all-sentinel buffer");
                PositionBuffer::zeroed(count)
            }
        };

        self.outbox
            .send(PipelineMessage::UpdateComplete { buffer })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::is_sentinel;
    use crate::test_support::{instant, record, FakePropagator};
    use std::time::Duration;

    async fn recv(controller_events: &mut PipelineController) -> bool {
        for _ in 0..200 {
            let outcome = controller_events.poll();
            if outcome.became_ready || outcome.buffer_updated {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_init_then_update_round_trip() {
        let metrics = Arc::new(PipelineMetrics::new());
        let propagator = Arc::new(FakePropagator::new().failing(2));
        let (worker, mut controller) =
            PropagationWorker::new(propagator, PropagationConfig::sequential(), Arc::clone(&metrics));
        let handle = tokio::spawn(worker.run());

        controller
            .init(vec![record(1, "A"), record(2, "B"), record(3, "C")])
            .unwrap();
        assert!(recv(&mut controller).await, "worker never became ready");
        assert_eq!(controller.object_count(), Some(3));

        assert!(controller.request_update(instant(1_700_000_000)));
        assert!(recv(&mut controller).await, "batch never completed");

        let buffer = controller.buffer().expect("buffer applied");
        assert_eq!(buffer.len(), 9);
        assert!(!is_sentinel(buffer.get(0).unwrap()));
        assert!(is_sentinel(buffer.get(1).unwrap()));
        assert!(!is_sentinel(buffer.get(2).unwrap()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.objects_loaded, 3);
        assert_eq!(snapshot.batches_completed, 1);
        assert_eq!(snapshot.last_batch_valid, 2);
        assert_eq!(snapshot.last_batch_failed, 1);

        controller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_exits_when_controller_dropped() {
        let metrics = Arc::new(PipelineMetrics::new());
        let (worker, controller) = PropagationWorker::new(
            Arc::new(FakePropagator::new()),
            PropagationConfig::sequential(),
            metrics,
        );
        let handle = tokio::spawn(worker.run());
        drop(controller);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should exit when its inbox closes")
            .unwrap();
    }
}
