//! Sequenced application traffic injected at the source relay.
//!
//! The generator runs for the whole simulated lifetime on a fixed interval.
//! It is never paused: a source with no believed route still generates,
//! and those messages become no-route drops in the forwarding engine.

use crate::debug::DebugEvent;
use crate::mesh::Mesh;
use crate::time::Timestamp;
use crate::traits::{Random, Timers, Transport};
use crate::types::Timer;
use crate::wire::Message;

/// Payload carried by generated messages.
pub const SAMPLE_PAYLOAD: &[u8] = b"status-report";

/// Sequence and send-count state, owned by the mesh rather than a global.
#[derive(Debug, Default)]
pub struct TrafficGenerator {
    next_seq: u32,
    sent: u64,
}

impl TrafficGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next message will carry.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl<R: Random> Mesh<R> {
    /// Generate the next application message at the source and submit it to
    /// the forwarding engine as if it had just arrived there.
    pub(crate) fn traffic_tick<E: Timers + Transport>(&mut self, env: &mut E, now: Timestamp) {
        let seq = self.traffic.next_seq;
        self.traffic.next_seq = self.traffic.next_seq.wrapping_add(1);
        self.traffic.sent += 1;

        env.schedule(self.config.traffic_interval, Timer::Traffic);
        self.emit(DebugEvent::TrafficGenerated {
            timestamp: now,
            seq,
        });

        let frame = Message::data(seq, SAMPLE_PAYLOAD).encode_to_vec();
        let source = self.config.source;
        self.forward_data(env, source, &frame, now);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::config::Config;
    use crate::mesh::Mesh;
    use crate::time::Timestamp;
    use crate::traits::test_impls::{MockEnv, MockRandom};
    use crate::types::Timer;
    use crate::wire::Message;

    const GATEWAY: u32 = 0;
    const SOURCE: u32 = 1;

    fn mesh() -> Mesh<MockRandom> {
        Mesh::new(
            Config::new(GATEWAY, SOURCE, vec![SOURCE, 2]),
            MockRandom::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_sequence_numbers_increment() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();
        mesh.graph.add_edge(SOURCE, GATEWAY);

        for _ in 0..3 {
            mesh.handle_timer(&mut env, Timer::Traffic, Timestamp::ZERO);
        }

        let sent = env.take_sent();
        let seqs: alloc::vec::Vec<u32> = sent
            .iter()
            .map(|(_, _, frame)| match Message::decode_from_slice(frame) {
                Ok(Message::Data(data)) => data.seq,
                other => panic!("expected data frame, got {:?}", other),
            })
            .collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(mesh.stats().messages_sent, 3);
        assert_eq!(mesh.traffic.next_seq(), 3);
    }

    #[test]
    fn test_tick_reschedules_itself() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();
        mesh.handle_timer(&mut env, Timer::Traffic, Timestamp::ZERO);

        assert_eq!(
            env.scheduled_timers(),
            vec![Timer::Traffic],
        );
    }

    #[test]
    fn test_isolated_source_counts_sent_but_drops() {
        let mut mesh = mesh();
        let mut env = MockEnv::new();

        mesh.handle_timer(&mut env, Timer::Traffic, Timestamp::ZERO);

        let stats = mesh.stats();
        assert_eq!(stats.messages_sent, 1);
        assert_eq!(stats.messages_delivered, 0);
        assert_eq!(stats.no_route_drops, 1);
        assert!(env.sent.is_empty());
    }
}
