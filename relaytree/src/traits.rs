//! Environment abstractions: timer service, radio transport, randomness.
//!
//! The protocol core never owns a clock, a socket, or an RNG stream. The
//! hosting environment (a discrete-event simulator, or eventually a real
//! node runtime) implements these traits and drives the mesh through its
//! `handle_rx` / `handle_timer` entry points.

use crate::time::Duration;
use crate::types::{NodeId, Timer};

/// Opaque handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Timer service supplied by the environment.
pub trait Timers {
    /// Schedule `timer` to fire after `delay`. The environment hands the
    /// same [`Timer`] value back through `handle_timer` when it fires.
    fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerHandle;

    /// Cancel a scheduled timer. Idempotent: cancelling a handle that has
    /// already fired or was already cancelled is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Best-effort, lossy message transport supplied by the environment.
///
/// Delivery to a node whose interface is down is dropped by the transport;
/// the protocol never observes such frames.
pub trait Transport {
    /// Broadcast a frame to every node currently in radio range of `from`.
    fn broadcast(&mut self, from: NodeId, frame: &[u8]);

    /// Unicast a frame to a specific peer.
    fn send(&mut self, from: NodeId, to: NodeId, frame: &[u8]);

    /// Current state of a node's uplink interface.
    fn is_interface_up(&self, node: NodeId) -> bool;

    /// Force a node's uplink interface up or down.
    fn set_interface_up(&mut self, node: NodeId, up: bool);

    /// Re-inject a frame onto the wired backbone segment behind the gateway.
    fn forward_to_backbone(&mut self, frame: &[u8]);
}

/// Randomness source injected into the mesh.
pub trait Random {
    /// Draw a duration from an exponential distribution with the given mean.
    fn exp_duration(&mut self, mean: Duration) -> Duration;
}

/// Recording implementations for tests and examples.
pub mod test_impls {
    use alloc::vec::Vec;
    use hashbrown::HashMap;

    use super::{Random, TimerHandle, Timers, Transport};
    use crate::time::Duration;
    use crate::types::{NodeId, Timer};

    /// Environment double that records every call.
    #[derive(Default)]
    pub struct MockEnv {
        next_handle: u64,
        /// Timers armed via `schedule`, in call order.
        pub scheduled: Vec<(Duration, Timer, TimerHandle)>,
        /// Handles passed to `cancel`, in call order.
        pub cancelled: Vec<TimerHandle>,
        /// Broadcast frames as `(from, frame)`.
        pub broadcasts: Vec<(NodeId, Vec<u8>)>,
        /// Unicast frames as `(from, to, frame)`.
        pub sent: Vec<(NodeId, NodeId, Vec<u8>)>,
        /// Frames handed to the wired backbone.
        pub backbone: Vec<Vec<u8>>,
        /// Interface states; untouched nodes report up.
        pub interfaces: HashMap<NodeId, bool>,
    }

    impl MockEnv {
        pub fn new() -> Self {
            Self::default()
        }

        /// Drain recorded unicasts.
        pub fn take_sent(&mut self) -> Vec<(NodeId, NodeId, Vec<u8>)> {
            core::mem::take(&mut self.sent)
        }

        /// Drain recorded broadcasts.
        pub fn take_broadcasts(&mut self) -> Vec<(NodeId, Vec<u8>)> {
            core::mem::take(&mut self.broadcasts)
        }

        /// The timers of a given kind currently recorded.
        pub fn scheduled_timers(&self) -> Vec<Timer> {
            self.scheduled.iter().map(|&(_, timer, _)| timer).collect()
        }
    }

    impl Timers for MockEnv {
        fn schedule(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
            let handle = TimerHandle::new(self.next_handle);
            self.next_handle += 1;
            self.scheduled.push((delay, timer, handle));
            handle
        }

        fn cancel(&mut self, handle: TimerHandle) {
            self.cancelled.push(handle);
        }
    }

    impl Transport for MockEnv {
        fn broadcast(&mut self, from: NodeId, frame: &[u8]) {
            self.broadcasts.push((from, frame.to_vec()));
        }

        fn send(&mut self, from: NodeId, to: NodeId, frame: &[u8]) {
            self.sent.push((from, to, frame.to_vec()));
        }

        fn is_interface_up(&self, node: NodeId) -> bool {
            self.interfaces.get(&node).copied().unwrap_or(true)
        }

        fn set_interface_up(&mut self, node: NodeId, up: bool) {
            self.interfaces.insert(node, up);
        }

        fn forward_to_backbone(&mut self, frame: &[u8]) {
            self.backbone.push(frame.to_vec());
        }
    }

    /// Deterministic randomness: returns the mean, or a fixed override.
    #[derive(Default)]
    pub struct MockRandom {
        fixed: Option<Duration>,
    }

    impl MockRandom {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fixed(duration: Duration) -> Self {
            Self {
                fixed: Some(duration),
            }
        }
    }

    impl Random for MockRandom {
        fn exp_duration(&mut self, mean: Duration) -> Duration {
            self.fixed.unwrap_or(mean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_impls::{MockEnv, MockRandom};
    use super::*;

    #[test]
    fn test_mock_env_records_timers() {
        let mut env = MockEnv::new();
        let h1 = env.schedule(Duration::from_millis(5), Timer::Traffic);
        let h2 = env.schedule(Duration::from_millis(9), Timer::Hello { node: 3 });
        assert_ne!(h1, h2);
        env.cancel(h1);
        assert_eq!(env.cancelled, alloc::vec![h1]);
        assert_eq!(env.scheduled.len(), 2);
    }

    #[test]
    fn test_mock_env_interface_defaults_up() {
        let mut env = MockEnv::new();
        assert!(env.is_interface_up(4));
        env.set_interface_up(4, false);
        assert!(!env.is_interface_up(4));
    }

    #[test]
    fn test_mock_random_returns_mean() {
        let mut random = MockRandom::new();
        let mean = Duration::from_millis(750);
        assert_eq!(random.exp_duration(mean), mean);

        let mut fixed = MockRandom::fixed(Duration::from_millis(42));
        assert_eq!(fixed.exp_duration(mean), Duration::from_millis(42));
    }
}
