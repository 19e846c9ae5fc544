//! Core types and constants for the relaytree protocol.

/// Node identifier assigned by the deployment.
///
/// One distinguished value is the gateway (the fixed access point bridging
/// into the wired backbone), another is the traffic source.
pub type NodeId = u32;

// Wire message tags (other values dropped as malformed)
pub const MSG_HELLO: u8 = 0;
pub const MSG_DATA: u8 = 1;

/// Upper bound on a data message payload.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

// Timing constants (in milliseconds)
pub const DEFAULT_HELLO_INTERVAL_MS: u64 = 1000;
pub const HELLO_EXPIRY_TOLERANCE_MS: u64 = 100;
pub const DEFAULT_TRAFFIC_INTERVAL_MS: u64 = 1000;
pub const TRAFFIC_START_DELAY_MS: u64 = 500;
pub const HELLO_STAGGER_BASE_MS: u64 = 10;
pub const DEFAULT_MEAN_ON_MS: u64 = 5000;
pub const DEFAULT_MEAN_OFF_MS: u64 = 500;

/// Timers the protocol arms through the environment's timer service.
///
/// The environment hands the value back unmodified when the timer fires,
/// so handlers never need to look up what a handle was armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Periodic Hello broadcast for one node.
    Hello { node: NodeId },
    /// Soft-state expiry for the edge `local -> remote`.
    EdgeExpiry { local: NodeId, remote: NodeId },
    /// Next application message at the source.
    Traffic,
    /// Duty-cycle transition: apply `up` to the node's uplink interface.
    DutyToggle { node: NodeId, up: bool },
}
