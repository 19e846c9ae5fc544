//! Gateway sink: end-to-end duplicate suppression and backbone hand-off.
//!
//! Flooding along multiple out-edges makes duplicate arrivals the normal
//! case, not an error; the sink admits each sequence number once and
//! silently discards the rest. The set grows for the lifetime of the run,
//! bounded only by the total number of generated messages.

use hashbrown::HashSet;

use crate::debug::DebugEvent;
use crate::mesh::Mesh;
use crate::time::Timestamp;
use crate::traits::{Random, Transport};

/// Sequence numbers already delivered at the gateway.
pub type SeenSequenceSet = HashSet<u32>;

/// Delivery state at the access point.
#[derive(Debug, Default)]
pub struct GatewaySink {
    seen: SeenSequenceSet,
    delivered: u64,
    duplicates: u64,
}

impl GatewaySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence numbers delivered so far.
    pub fn seen(&self) -> &SeenSequenceSet {
        &self.seen
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Admit a sequence number; false when it was already delivered.
    pub(crate) fn admit(&mut self, seq: u32) -> bool {
        if self.seen.insert(seq) {
            self.delivered += 1;
            true
        } else {
            self.duplicates += 1;
            false
        }
    }
}

impl<R: Random> Mesh<R> {
    /// Handle a decoded data frame arriving at the access point.
    pub(crate) fn deliver_at_gateway<E: Transport>(
        &mut self,
        env: &mut E,
        seq: u32,
        frame: &[u8],
        now: Timestamp,
    ) {
        if self.sink.admit(seq) {
            env.forward_to_backbone(frame);
            self.emit(DebugEvent::DataDelivered {
                timestamp: now,
                seq,
            });
        } else {
            self.emit(DebugEvent::DuplicateDiscarded { seq });
        }
    }
}
