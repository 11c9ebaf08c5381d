//! Messages exchanged between the interactive and background contexts.

use chrono::{DateTime, Utc};

use crate::catalog::CompactRecord;
use crate::propagation::PositionBuffer;

/// The pipeline boundary protocol.
///
/// Exactly four message kinds cross the boundary. `Init` and `UpdateRequest`
/// flow towards the background worker; `Ready` and `UpdateComplete` flow back
/// to the interactive controller. Either side treats a message of the wrong
/// direction as a protocol violation and drops it.
#[derive(Debug)]
pub enum PipelineMessage {
    /// Load the catalog and build propagator handles.
    Init(Vec<CompactRecord>),

    /// Handles are built; `count` slots are available.
    Ready { count: usize },

    /// Propagate every object to `instant`.
    UpdateRequest { instant: DateTime<Utc> },

    /// A finished batch; ownership of `buffer` moves to the receiver.
    UpdateComplete { buffer: PositionBuffer },
}

impl PipelineMessage {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineMessage::Init(_) => "init",
            PipelineMessage::Ready { .. } => "ready",
            PipelineMessage::UpdateRequest { .. } => "update_request",
            PipelineMessage::UpdateComplete { .. } => "update_complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kinds() {
        let at = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(PipelineMessage::Init(Vec::new()).kind(), "init");
        assert_eq!(PipelineMessage::Ready { count: 3 }.kind(), "ready");
        assert_eq!(PipelineMessage::UpdateRequest { instant: at }.kind(), "update_request");
        assert_eq!(
            PipelineMessage::UpdateComplete {
                buffer: PositionBuffer::zeroed(1)
            }
            .kind(),
            "update_complete"
        );
    }
}
