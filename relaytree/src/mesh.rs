//! Mesh state machine - dispatch and externally observable state.
//!
//! One `Mesh` instance owns the protocol state for an entire deployment:
//! the forwarding graph, the per-edge expiry handles, the gateway's
//! sequence set, and the traffic counters. All per-node handlers run on a
//! single logical timeline, one event at a time, so the state needs no
//! locking; the environment serializes access by construction.
//!
//! # Usage
//!
//! ```ignore
//! let mut mesh = Mesh::new(config, random)?;
//! mesh.start(&mut env);                        // arms initial timers
//!
//! // Invoked by the environment:
//! mesh.handle_rx(&mut env, node, &frame, now); // per delivered frame
//! mesh.handle_timer(&mut env, timer, now);     // per fired timer
//! ```

use hashbrown::HashMap;

use crate::config::{Config, ConfigError};
use crate::debug::{DebugChannel, DebugEvent};
use crate::graph::TopologyGraph;
use crate::sink::GatewaySink;
use crate::time::{Duration, Timestamp};
use crate::traffic::TrafficGenerator;
use crate::traits::{Random, TimerHandle, Timers, Transport};
use crate::types::{NodeId, Timer, HELLO_STAGGER_BASE_MS};
use crate::wire::Message;

/// Pending expiry handles keyed by the `(local, remote)` edge they reclaim.
pub type EdgeTimerMap = HashMap<(NodeId, NodeId), TimerHandle>;

/// Externally observable protocol counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Application messages generated at the source.
    pub messages_sent: u64,
    /// Unique sequence numbers delivered at the gateway.
    pub messages_delivered: u64,
    /// Messages dropped after repair found no route.
    pub no_route_drops: u64,
    /// Duplicate sequence numbers discarded at the gateway.
    pub duplicates_discarded: u64,
    /// Frames dropped because they failed to decode.
    pub malformed_dropped: u64,
}

/// The protocol state machine.
///
/// Generic over the injected randomness source `R`; the timer service and
/// transport are passed into each handler by the environment that owns them.
pub struct Mesh<R> {
    pub(crate) config: Config,
    pub(crate) random: R,
    pub(crate) graph: TopologyGraph,
    pub(crate) edge_timers: EdgeTimerMap,
    pub(crate) sink: GatewaySink,
    pub(crate) traffic: TrafficGenerator,
    pub(crate) no_route_drops: u64,
    pub(crate) malformed_dropped: u64,
    debug: DebugChannel,
}

impl<R: Random> Mesh<R> {
    /// Create a mesh, rejecting invalid configuration before any state exists.
    pub fn new(config: Config, random: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            random,
            graph: TopologyGraph::new(),
            edge_timers: EdgeTimerMap::new(),
            sink: GatewaySink::new(),
            traffic: TrafficGenerator::new(),
            no_route_drops: 0,
            malformed_dropped: 0,
            debug: DebugChannel::new(),
        })
    }

    /// Arm the initial timers: staggered Hellos for every node, duty-cycle
    /// kickoff for every relay except the source, and the first traffic tick.
    pub fn start<E: Timers + Transport>(&mut self, env: &mut E) {
        for (i, &node) in self.config.relays.iter().enumerate() {
            let offset = Duration::from_millis(i as u64 + HELLO_STAGGER_BASE_MS);
            env.schedule(offset, Timer::Hello { node });
        }
        let gateway_offset =
            Duration::from_millis(self.config.relays.len() as u64 + HELLO_STAGGER_BASE_MS);
        env.schedule(
            gateway_offset,
            Timer::Hello {
                node: self.config.gateway,
            },
        );

        if self.config.duty_cycle.is_some() {
            for (i, &node) in self.config.relays.iter().enumerate() {
                if node == self.config.source {
                    continue;
                }
                env.schedule(Duration::from_millis(i as u64), Timer::DutyToggle { node, up: true });
            }
        }

        env.schedule(self.config.traffic_start, Timer::Traffic);
    }

    /// Entry point the transport invokes for every frame delivered to `node`.
    pub fn handle_rx<E: Timers + Transport>(
        &mut self,
        env: &mut E,
        node: NodeId,
        frame: &[u8],
        now: Timestamp,
    ) {
        match Message::decode_from_slice(frame) {
            Ok(Message::Hello(hello)) => self.handle_hello(env, node, hello.origin, now),
            Ok(Message::Data(data)) => {
                if node == self.config.gateway {
                    self.deliver_at_gateway(env, data.seq, frame, now);
                } else {
                    self.forward_data(env, node, frame, now);
                }
            }
            Err(_) => {
                self.malformed_dropped += 1;
                self.emit(DebugEvent::DecodeFailed {
                    node,
                    data_len: frame.len(),
                });
            }
        }
    }

    /// Entry point the timer service invokes for every fired timer.
    pub fn handle_timer<E: Timers + Transport>(
        &mut self,
        env: &mut E,
        timer: Timer,
        now: Timestamp,
    ) {
        match timer {
            Timer::Hello { node } => self.hello_tick(env, node, now),
            Timer::EdgeExpiry { local, remote } => self.expire_edge(local, remote, now),
            Timer::Traffic => self.traffic_tick(env, now),
            Timer::DutyToggle { node, up } => self.switch_interface(env, node, up, now),
        }
    }

    /// Current snapshot of the forwarding graph.
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    /// Externally observable counters.
    pub fn stats(&self) -> MeshStats {
        MeshStats {
            messages_sent: self.traffic.sent(),
            messages_delivered: self.sink.delivered(),
            no_route_drops: self.no_route_drops,
            duplicates_discarded: self.sink.duplicates(),
            malformed_dropped: self.malformed_dropped,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gateway-side delivery state.
    pub fn sink(&self) -> &GatewaySink {
        &self.sink
    }

    /// Channel of debug events for tracing harnesses.
    pub fn debug_channel(&self) -> &DebugChannel {
        &self.debug
    }

    pub(crate) fn emit(&self, event: DebugEvent) {
        // Dropped when no harness is draining.
        let _ = self.debug.try_send(event);
    }
}
