//! Debug events for protocol tracing.
//!
//! The mesh pushes these into a bounded channel as it processes events; a
//! harness drains them for logging and assertions. When nobody drains the
//! channel, new events are dropped once it fills.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;

use crate::time::Timestamp;
use crate::types::NodeId;

pub(crate) const DEBUG_QUEUE_SIZE: usize = 64;

/// Channel carrying debug events out of the mesh.
///
/// The protocol runs on a single logical timeline, so a noop mutex is
/// sufficient; there is never a second thread of execution inside the mesh.
pub type DebugChannel = Channel<NoopRawMutex, DebugEvent, DEBUG_QUEUE_SIZE>;

/// Debug events emitted by the mesh for protocol tracing.
#[derive(Clone, Debug)]
pub enum DebugEvent {
    /// A node broadcast its periodic Hello.
    HelloSent { timestamp: Timestamp, node: NodeId },
    /// The gateway received a Hello and ignored it (it never creates edges).
    HelloIgnoredAtGateway { from: NodeId },
    /// A fresh edge was added to the graph.
    EdgeAdded {
        timestamp: Timestamp,
        local: NodeId,
        remote: NodeId,
    },
    /// An existing edge was refreshed by a Hello.
    EdgeRefreshed { local: NodeId, remote: NodeId },
    /// Edge creation refused because the reverse edge exists.
    EdgeRefused { local: NodeId, remote: NodeId },
    /// An edge expired after missing its refresh window.
    EdgeExpired {
        timestamp: Timestamp,
        local: NodeId,
        remote: NodeId,
    },
    /// Repair reversed `donor -> orphan` into `orphan -> donor`.
    EdgeReversed {
        timestamp: Timestamp,
        donor: NodeId,
        orphan: NodeId,
    },
    /// A data frame was replicated to every out-neighbor.
    DataForwarded { from: NodeId, copies: usize },
    /// A data frame was dropped.
    DataDropped { node: NodeId, reason: &'static str },
    /// The gateway delivered a new sequence number to the backbone.
    DataDelivered { timestamp: Timestamp, seq: u32 },
    /// The gateway discarded an already-seen sequence number.
    DuplicateDiscarded { seq: u32 },
    /// A frame failed to decode and was dropped.
    DecodeFailed { node: NodeId, data_len: usize },
    /// The source generated a new application message.
    TrafficGenerated { timestamp: Timestamp, seq: u32 },
    /// The duty-cycle controller switched an uplink interface.
    InterfaceSwitched {
        timestamp: Timestamp,
        node: NodeId,
        was_up: bool,
        up: bool,
    },
}
