//! Interactive-side pipeline controller.
//!
//! The controller lives on the interactive (per-frame) context and never
//! blocks. It gates update requests so that at most one batch is ever in
//! flight, and validates every completed buffer before it becomes current.
//!
//! ```text
//!                 init()                Ready{count}
//!  Uninitialized ────────► (waiting) ─────────────────► Idle
//!                                                       │  ▲
//!                              request_update(instant)  │  │ UpdateComplete{buffer}
//!                                                       ▼  │
//!                                                    Requesting
//! ```
//!
//! A `request_update` while `Requesting` is dropped, not queued. The next
//! frame after the completion simply asks again with its own instant.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::message::PipelineMessage;
use super::PipelineError;
use crate::catalog::CompactRecord;
use crate::propagation::PositionBuffer;
use crate::telemetry::PipelineMetrics;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No `Ready` received yet. Updates are not dispatched.
    Uninitialized,
    /// Ready, nothing in flight.
    Idle,
    /// Exactly one batch request is outstanding.
    Requesting,
}

/// What a call to [`PipelineController::poll`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// The worker reported `Ready` during this poll.
    pub became_ready: bool,
    /// A new buffer became current during this poll.
    pub buffer_updated: bool,
    /// Completed buffers discarded during this poll.
    pub rejected: usize,
}

/// The interactive half of the pipeline.
pub struct PipelineController {
    state: PipelineState,
    object_count: Option<usize>,
    init_sent: bool,
    current: Option<PositionBuffer>,
    requests: mpsc::UnboundedSender<PipelineMessage>,
    events: mpsc::UnboundedReceiver<PipelineMessage>,
    metrics: Arc<PipelineMetrics>,
    shutdown: CancellationToken,
    dispatched: u64,
    disconnected: bool,
}

impl PipelineController {
    pub(crate) fn new(
        requests: mpsc::UnboundedSender<PipelineMessage>,
        events: mpsc::UnboundedReceiver<PipelineMessage>,
        metrics: Arc<PipelineMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            state: PipelineState::Uninitialized,
            object_count: None,
            init_sent: false,
            current: None,
            requests,
            events,
            metrics,
            shutdown,
            dispatched: 0,
            disconnected: false,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Whether a batch request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.state == PipelineState::Requesting
    }

    /// Object count reported by `Ready`, once initialized.
    pub fn object_count(&self) -> Option<usize> {
        self.object_count
    }

    /// Number of update requests actually sent to the worker.
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }

    /// Whether the worker side of the channel has gone away.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// The current buffer, if any batch has completed.
    pub fn buffer(&self) -> Option<&PositionBuffer> {
        self.current.as_ref()
    }

    /// Move the current buffer out, leaving none.
    pub fn take_buffer(&mut self) -> Option<PositionBuffer> {
        self.current.take()
    }

    /// Hand the catalog to the worker.
    pub fn init(&mut self, records: Vec<CompactRecord>) -> Result<(), PipelineError> {
        if self.init_sent {
            return Err(PipelineError::AlreadyInitialized);
        }

        let count = records.len();
        self.requests
            .send(PipelineMessage::Init(records))
            .map_err(|_| {
                self.disconnected = true;
                PipelineError::Disconnected
            })?;

        self.init_sent = true;
        info!(records = count, "Catalog sent to propagation worker");
        Ok(())
    }

    /// Request a batch for `instant`.
    ///
    /// Returns true when a request was dispatched. Returns false, with no
    /// side effects beyond a dropped-request counter, while uninitialized or
    /// while a request is already outstanding.
    pub fn request_update(&mut self, instant: DateTime<Utc>) -> bool {
        match self.state {
            PipelineState::Uninitialized => {
                trace!(%instant, "Update before ready, skipped");
                self.metrics.request_dropped();
                return false;
            }
            PipelineState::Requesting => {
                trace!(%instant, "Update already pending, dropped");
                self.metrics.request_dropped();
                return false;
            }
            PipelineState::Idle => {}
        }

        if self
            .requests
            .send(PipelineMessage::UpdateRequest { instant })
            .is_err()
        {
            if !self.disconnected {
                warn!("Propagation worker gone, update not dispatched");
            }
            self.disconnected = true;
            self.metrics.request_dropped();
            return false;
        }

        self.state = PipelineState::Requesting;
        self.dispatched += 1;
        self.metrics.request_accepted();
        trace!(%instant, dispatched = self.dispatched, "Update dispatched");
        true
    }

    /// Handle a `Ready` notification.
    pub fn on_ready(&mut self, count: usize) {
        if self.state != PipelineState::Uninitialized {
            warn!(count, "Duplicate ready notification ignored");
            self.metrics.protocol_violation();
            return;
        }

        self.object_count = Some(count);
        self.state = PipelineState::Idle;
        info!(objects = count, "Propagation pipeline ready");
    }

    /// Handle an `UpdateComplete`.
    ///
    /// The pending flag is cleared whenever a completion for the outstanding
    /// request arrives, including one whose buffer is then rejected, so a bad
    /// batch never stalls the pipeline.
    pub fn on_batch_complete(&mut self, buffer: PositionBuffer) -> Result<(), PipelineError> {
        if self.state != PipelineState::Requesting {
            self.metrics.protocol_violation();
            self.metrics.batch_rejected();
            return Err(PipelineError::UnexpectedCompletion);
        }
        self.state = PipelineState::Idle;

        let expected = self.object_count.unwrap_or_default();
        if !buffer.matches_count(expected) {
            self.metrics.batch_rejected();
            return Err(PipelineError::BufferLengthMismatch {
                expected: expected * crate::propagation::COMPONENTS,
                actual: buffer.len(),
            });
        }

        self.current = Some(buffer);
        self.metrics.batch_completed();
        Ok(())
    }

    /// Drain every message the worker has sent so far, without blocking.
    pub fn poll(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        loop {
            match self.events.try_recv() {
                Ok(PipelineMessage::Ready { count }) => {
                    let was_uninitialized = self.state == PipelineState::Uninitialized;
                    self.on_ready(count);
                    outcome.became_ready |= was_uninitialized;
                }
                Ok(PipelineMessage::UpdateComplete { buffer }) => match self.on_batch_complete(buffer) {
                    Ok(()) => outcome.buffer_updated = true,
                    Err(e) => {
                        error!(error = %e, "Discarding completed batch");
                        outcome.rejected += 1;
                    }
                },
                Ok(other) => {
                    warn!(kind = other.kind(), "Unexpected message from worker, dropped");
                    self.metrics.protocol_violation();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!(pending = self.is_pending(), "Propagation worker disconnected");
                    }
                    if self.state == PipelineState::Requesting {
                        self.state = PipelineState::Idle;
                    }
                    self.disconnected = true;
                    break;
                }
            }
        }

        outcome
    }

    /// Stop the background worker.
    pub fn shutdown(&self) {
        debug!("Pipeline shutdown requested");
        self.shutdown.cancel();
    }
}
