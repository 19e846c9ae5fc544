//! Metrics collection, graph snapshots, and the per-run results record.

use core::fmt;

use relaytree::{Duration, MeshStats, NodeId, Timestamp, TopologyGraph};

/// Forwarding-graph state captured at a point in time.
#[derive(Clone, Debug)]
pub struct GraphSnapshot {
    pub time: Timestamp,
    pub graph: TopologyGraph,
    pub stats: MeshStats,
}

impl GraphSnapshot {
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.graph.out_neighbors(node).len()
    }

    /// Whether the node believed a route toward the gateway at capture time.
    pub fn gateway_reachable(&self, node: NodeId, gateway: NodeId) -> bool {
        self.graph.reaches(node, gateway)
    }
}

/// Transport-level counters collected over a run.
#[derive(Clone, Debug, Default)]
pub struct SimMetrics {
    /// Frames handed to the radio (one per addressed receiver).
    pub frames_sent: u64,
    /// Frames lost to the loss rate or a downed interface.
    pub frames_dropped: u64,
    /// Frames delivered into a node's receive path.
    pub frames_delivered: u64,
    /// Graph snapshots taken at intervals and at run end.
    pub snapshots: Vec<GraphSnapshot>,
}

impl SimMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_snapshot(&mut self, snapshot: GraphSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn latest_snapshot(&self) -> Option<&GraphSnapshot> {
        self.snapshots.last()
    }
}

/// Result of running a simulation.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Final simulation time.
    pub end_time: Timestamp,
    /// Whether the run ended with an empty event queue (vs the time limit).
    pub queue_exhausted: bool,
    /// Transport-level metrics.
    pub metrics: SimMetrics,
    /// Protocol counters at run end.
    pub stats: MeshStats,
    /// Summary row for result logs.
    pub record: ResultsRecord,
}

impl SimulationResult {
    /// Unique deliveries per generated message.
    pub fn delivery_ratio(&self) -> f64 {
        if self.stats.messages_sent == 0 {
            return 0.0;
        }
        self.stats.messages_delivered as f64 / self.stats.messages_sent as f64
    }
}

/// One run's parameters and outcome, rendered as a semicolon-separated row
/// for appending to a results file.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsRecord {
    pub hello_interval: Duration,
    pub nodes: usize,
    pub range: f64,
    pub area: f64,
    pub seed: u64,
    pub sent: u64,
    pub received: u64,
}

impl fmt::Display for ResultsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{};{};{};{}",
            self.hello_interval.as_millis(),
            self.nodes,
            self.range,
            self.area,
            self.seed,
            self.sent,
            self.received
        )
    }
}
