//! Neighbor discovery: periodic Hello broadcast and soft-state edge refresh.
//!
//! Every node broadcasts a Hello carrying its own id on a fixed interval.
//! Receiving a Hello creates or refreshes a directed edge toward the sender
//! and re-arms that edge's expiry timer. An edge that stops being refreshed
//! is reclaimed when the timer fires; there is no explicit teardown message.

use crate::debug::DebugEvent;
use crate::mesh::Mesh;
use crate::time::Timestamp;
use crate::traits::{Random, Timers, Transport};
use crate::types::{NodeId, Timer};
use crate::wire::Message;

impl<R: Random> Mesh<R> {
    /// Broadcast this node's Hello and arm the next tick.
    pub(crate) fn hello_tick<E: Timers + Transport>(
        &mut self,
        env: &mut E,
        node: NodeId,
        now: Timestamp,
    ) {
        let frame = Message::hello(node).encode_to_vec();
        env.broadcast(node, &frame);
        env.schedule(self.config.hello_interval, Timer::Hello { node });
        self.emit(DebugEvent::HelloSent {
            timestamp: now,
            node,
        });
    }

    /// Process a Hello from `origin` received at `local`.
    pub(crate) fn handle_hello<E: Timers>(
        &mut self,
        env: &mut E,
        local: NodeId,
        origin: NodeId,
        now: Timestamp,
    ) {
        // The gateway is the root of the forwarding graph; it receives
        // Hellos without ill effect but never creates edges.
        if local == self.config.gateway {
            self.emit(DebugEvent::HelloIgnoredAtGateway { from: origin });
            return;
        }
        if origin == local {
            return;
        }

        // origin already routes through us; adding local -> origin would
        // close a 2-cycle with a node that is downstream of us.
        if self.graph.has_edge(origin, local) {
            self.emit(DebugEvent::EdgeRefused {
                local,
                remote: origin,
            });
            return;
        }

        if self.graph.add_edge(local, origin) {
            self.emit(DebugEvent::EdgeAdded {
                timestamp: now,
                local,
                remote: origin,
            });
        } else {
            self.emit(DebugEvent::EdgeRefreshed {
                local,
                remote: origin,
            });
        }

        // Re-arm the expiry window for this edge.
        if let Some(handle) = self.edge_timers.remove(&(local, origin)) {
            env.cancel(handle);
        }
        let handle = env.schedule(
            self.config.edge_expiry(),
            Timer::EdgeExpiry {
                local,
                remote: origin,
            },
        );
        self.edge_timers.insert((local, origin), handle);
    }

    /// Reclaim an edge whose refresh window elapsed.
    pub(crate) fn expire_edge(&mut self, local: NodeId, remote: NodeId, now: Timestamp) {
        self.edge_timers.remove(&(local, remote));
        if self.graph.remove_edge(local, remote) {
            self.emit(DebugEvent::EdgeExpired {
                timestamp: now,
                local,
                remote,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::config::Config;
    use crate::mesh::Mesh;
    use crate::time::{Duration, Timestamp};
    use crate::traits::test_impls::{MockEnv, MockRandom};
    use crate::types::Timer;
    use crate::wire::Message;

    const GATEWAY: u32 = 0;
    const A: u32 = 1;
    const B: u32 = 2;

    fn mesh() -> Mesh<MockRandom> {
        Mesh::new(Config::new(GATEWAY, A, vec![A, B]), MockRandom::new()).unwrap()
    }

    fn hello_frame(origin: u32) -> alloc::vec::Vec<u8> {
        Message::hello(origin).encode_to_vec()
    }

    #[test]
    fn test_hello_creates_edge_and_arms_expiry() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_rx(&mut env, A, &hello_frame(B), Timestamp::ZERO);

        assert_eq!(mesh.graph().out_neighbors(A), &[B]);
        assert_eq!(env.scheduled.len(), 1);
        let (delay, timer, _) = env.scheduled[0];
        assert_eq!(delay, Duration::from_millis(1100));
        assert_eq!(timer, Timer::EdgeExpiry { local: A, remote: B });
        assert!(env.cancelled.is_empty());
    }

    #[test]
    fn test_refresh_cancels_and_rearms() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_rx(&mut env, A, &hello_frame(B), Timestamp::ZERO);
        let first_handle = env.scheduled[0].2;
        mesh.handle_rx(&mut env, A, &hello_frame(B), Timestamp::from_millis(900));

        // Edge unchanged, old timer cancelled, fresh one armed.
        assert_eq!(mesh.graph().out_neighbors(A), &[B]);
        assert_eq!(env.cancelled, vec![first_handle]);
        assert_eq!(env.scheduled.len(), 2);
    }

    #[test]
    fn test_two_cycle_prevention() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        // B -> A first, then A's discovery step must refuse A -> B.
        mesh.handle_rx(&mut env, B, &hello_frame(A), Timestamp::ZERO);
        assert_eq!(mesh.graph().out_neighbors(B), &[A]);

        mesh.handle_rx(&mut env, A, &hello_frame(B), Timestamp::from_millis(1));
        assert!(mesh.graph().out_neighbors(A).is_empty());
        // No duplicate of B -> A either.
        assert_eq!(mesh.graph().out_neighbors(B), &[A]);
    }

    #[test]
    fn test_expiry_removes_edge() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_rx(&mut env, A, &hello_frame(B), Timestamp::ZERO);
        mesh.handle_timer(
            &mut env,
            Timer::EdgeExpiry { local: A, remote: B },
            Timestamp::from_millis(1100),
        );

        assert!(mesh.graph().out_neighbors(A).is_empty());
        // Firing again is a no-op.
        mesh.handle_timer(
            &mut env,
            Timer::EdgeExpiry { local: A, remote: B },
            Timestamp::from_millis(2200),
        );
        assert!(mesh.graph().is_empty());
    }

    #[test]
    fn test_gateway_never_creates_edges() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_rx(&mut env, GATEWAY, &hello_frame(A), Timestamp::ZERO);
        assert!(mesh.graph().is_empty());
        assert!(env.scheduled.is_empty());
    }

    #[test]
    fn test_own_hello_ignored() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_rx(&mut env, A, &hello_frame(A), Timestamp::ZERO);
        assert!(mesh.graph().is_empty());
    }

    #[test]
    fn test_hello_tick_broadcasts_and_reschedules() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_timer(&mut env, Timer::Hello { node: A }, Timestamp::ZERO);

        assert_eq!(env.broadcasts.len(), 1);
        let (from, frame) = &env.broadcasts[0];
        assert_eq!(*from, A);
        assert_eq!(Message::decode_from_slice(frame), Ok(Message::hello(A)));
        assert_eq!(
            env.scheduled_timers(),
            vec![Timer::Hello { node: A }],
        );
    }
}
