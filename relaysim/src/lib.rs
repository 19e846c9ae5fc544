//! relaysim - deterministic discrete event simulator for the relaytree
//! protocol.
//!
//! Runs an entire mesh in a single process with no real-time delays. The
//! simulator supplies everything the protocol treats as an external
//! collaborator: a timer service backed by the event queue, a radio model
//! with positions, propagation range, delay, and loss, per-node interface
//! state for duty cycling, and the wired backbone behind the gateway.
//!
//! # Example
//!
//! ```
//! use relaysim::{line_scenario, Duration};
//!
//! // source - relay - gateway chain, 10 simulated seconds
//! let result = line_scenario(2).run_for(Duration::from_secs(10)).unwrap();
//!
//! assert_eq!(result.stats.messages_sent, 10);
//! assert_eq!(result.stats.messages_delivered, 10);
//! ```
//!
//! # Architecture
//!
//! The event queue orders events by `(time, sequence)`. The main loop pops
//! the next event, advances simulated time, and calls the mesh's
//! `handle_timer` or `handle_rx` entry point; outgoing frames and freshly
//! armed timers land back in the queue through the environment traits the
//! simulator implements. Identical seeds replay identical runs.

pub mod event;
pub mod metrics;
pub mod rng;
pub mod scenario;
pub mod sim;
pub mod topology;

// Re-export main types, including the protocol surface tests touch most.
pub use event::{Event, ScheduledEvent, SequenceNumber};
pub use metrics::{GraphSnapshot, ResultsRecord, SimMetrics, SimulationResult};
pub use relaytree::{Config, Duration, DutyCycleConfig, Mesh, MeshStats, NodeId, Timestamp};
pub use rng::SimRandom;
pub use scenario::{line_scenario, ScenarioBuilder, ScenarioError, GATEWAY_ID};
pub use sim::Simulator;
pub use topology::Topology;
