#![forbid(unsafe_code)]
//! relaytree - self-healing relay-tree routing for intermittently connected
//! multi-hop meshes.
//!
//! A set of mobile relays delivers sequenced data messages from a single
//! source to a fixed gateway bridging into a wired backbone, with no
//! pre-provisioned routing table and with relays randomly losing and
//! regaining connectivity. The protocol discovers topology through periodic
//! Hello broadcasts, builds a directed forwarding graph rooted at the
//! gateway, expires unrefreshed edges, repairs orphaned nodes by reversing
//! incoming edges, and deduplicates by sequence number at the gateway.
//!
//! This crate is `no_std` but requires `alloc`. It contains no clock, no
//! sockets, and no RNG of its own: the hosting environment implements the
//! [`Timers`], [`Transport`], and [`Random`] traits and drives the mesh one
//! event at a time, which makes every run replayable under a
//! discrete-event harness.
//!
//! # Key Properties
//!
//! - Soft state: an edge not refreshed by Hello traffic within
//!   `hello_interval + tolerance` is reclaimed automatically
//! - Flooding along all believed tree edges, not single-path routing;
//!   reliability comes from replication and repair, not retransmission
//! - Re-parenting repair: a node that lost its route borrows direction
//!   from the nodes still pointing at it
//! - Single logical timeline: handlers run to completion, one at a time,
//!   so the shared graph needs no locking
//!
//! # Example
//!
//! ```
//! use relaytree::{Config, Mesh};
//! use relaytree::traits::test_impls::{MockEnv, MockRandom};
//!
//! // Gateway 0, source 1, one extra relay.
//! let config = Config::new(0, 1, vec![1, 2]);
//! let mut mesh = Mesh::new(config, MockRandom::new()).unwrap();
//!
//! // The environment arms the initial timers and then drives the mesh.
//! let mut env = MockEnv::new();
//! mesh.start(&mut env);
//!
//! assert!(mesh.graph().is_empty());
//! assert_eq!(mesh.stats().messages_sent, 0);
//! ```
//!
//! # Module Structure
//!
//! - [`types`] - Node ids, timers, protocol constants
//! - [`time`] - Millisecond timestamp and duration types
//! - [`wire`] - Wire format serialization
//! - [`graph`] - The shared directed forwarding graph
//! - [`config`] - Runtime configuration and startup validation
//! - [`traits`] - Timer service, transport, and randomness seams
//! - [`mesh`] - The state machine and its entry points
//! - [`discovery`] - Hello broadcast and soft-state edge refresh
//! - [`routing`] - Forwarding engine and re-parenting repair
//! - [`sink`] - Gateway-side dedup and backbone hand-off
//! - [`traffic`] - Sequenced traffic generation at the source
//! - [`duty`] - Duty-cycle controller for relay uplinks
//! - [`debug`] - Debug event channel for tracing harnesses

#![no_std]

extern crate alloc;

pub mod config;
pub mod debug;
pub mod discovery;
pub mod duty;
pub mod graph;
pub mod mesh;
pub mod routing;
pub mod sink;
pub mod time;
pub mod traffic;
pub mod traits;
pub mod types;
pub mod wire;

// Re-export main types at crate root
pub use config::{Config, ConfigError, DutyCycleConfig};
pub use debug::{DebugChannel, DebugEvent};
pub use graph::TopologyGraph;
pub use mesh::{Mesh, MeshStats};
pub use sink::{GatewaySink, SeenSequenceSet};
pub use time::{Duration, Timestamp};
pub use traffic::TrafficGenerator;
pub use traits::{Random, TimerHandle, Timers, Transport};
pub use types::{NodeId, Timer};
pub use wire::{Data, DecodeError, Hello, Message};

// Re-export constants
pub use types::{
    DEFAULT_HELLO_INTERVAL_MS, DEFAULT_TRAFFIC_INTERVAL_MS, HELLO_EXPIRY_TOLERANCE_MS,
    MAX_PAYLOAD_SIZE, MSG_DATA, MSG_HELLO,
};
