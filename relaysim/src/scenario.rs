//! Scenario builder: placement, validation, and run helpers.
//!
//! Node ids are assigned here: the gateway is id 0, relays are 1..=n, and
//! the first relay generates the traffic. Invalid parameters are rejected
//! before the simulator exists.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;

use relaytree::{Config, ConfigError, Duration, DutyCycleConfig, NodeId};

use crate::metrics::SimulationResult;
use crate::sim::Simulator;
use crate::topology::Topology;

/// The fixed access point's node id.
pub const GATEWAY_ID: NodeId = 0;

/// Scenario parameter violations, fatal before the simulation begins.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario requires at least one relay")]
    NoRelays,
    #[error("propagation range must be positive, got {0}")]
    NonPositiveRange(f64),
    #[error("scenario side must be positive, got {0}")]
    NonPositiveSide(f64),
    #[error("invalid protocol config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug)]
enum Placement {
    /// Relays uniformly at random, gateway at the field center.
    RandomSquare,
    /// Source, relays, then gateway on a line with the given spacing.
    Line { spacing: f64 },
}

/// Builder for simulation scenarios.
#[derive(Clone, Debug)]
pub struct ScenarioBuilder {
    relays: usize,
    seed: u64,
    side: f64,
    range: f64,
    hello_interval: Duration,
    traffic_interval: Duration,
    duty_cycle: Option<DutyCycleConfig>,
    loss_rate: f64,
    delay: Duration,
    snapshot_interval: Option<Duration>,
    placement: Placement,
}

impl ScenarioBuilder {
    /// Create a scenario with the given number of mobile relays and the
    /// historical defaults: 500 m side, 1000 m range, 1 s hello and traffic
    /// intervals, duty cycling on.
    pub fn new(relays: usize) -> Self {
        Self {
            relays,
            seed: 1234,
            side: 500.0,
            range: 1000.0,
            hello_interval: Duration::from_millis(1000),
            traffic_interval: Duration::from_millis(1000),
            duty_cycle: Some(DutyCycleConfig::default()),
            loss_rate: 0.0,
            delay: Duration::from_millis(1),
            snapshot_interval: None,
            placement: Placement::RandomSquare,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_side(mut self, side: f64) -> Self {
        self.side = side;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn with_hello_interval(mut self, interval: Duration) -> Self {
        self.hello_interval = interval;
        self
    }

    pub fn with_traffic_interval(mut self, interval: Duration) -> Self {
        self.traffic_interval = interval;
        self
    }

    pub fn with_duty_cycle(mut self, duty_cycle: DutyCycleConfig) -> Self {
        self.duty_cycle = Some(duty_cycle);
        self
    }

    /// Keep every relay's interface up for the whole run.
    pub fn without_duty_cycle(mut self) -> Self {
        self.duty_cycle = None;
        self
    }

    pub fn with_loss_rate(mut self, rate: f64) -> Self {
        self.loss_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = Some(interval);
        self
    }

    /// Place source, relays, and gateway on a line instead of at random.
    pub fn line_placement(mut self, spacing: f64) -> Self {
        self.placement = Placement::Line { spacing };
        self
    }

    /// Build the simulator. Returns the relay ids (the gateway is
    /// [`GATEWAY_ID`], the source is the first relay).
    pub fn build(self) -> Result<(Simulator, Vec<NodeId>), ScenarioError> {
        if self.relays == 0 {
            return Err(ScenarioError::NoRelays);
        }
        if self.range <= 0.0 {
            return Err(ScenarioError::NonPositiveRange(self.range));
        }
        if self.side <= 0.0 {
            return Err(ScenarioError::NonPositiveSide(self.side));
        }

        let relay_ids: Vec<NodeId> = (1..=self.relays as NodeId).collect();
        let source = relay_ids[0];

        let topology = match self.placement {
            Placement::Line { spacing } => {
                let mut order = relay_ids.clone();
                order.push(GATEWAY_ID);
                Topology::line(&order, spacing, self.range)
            }
            Placement::RandomSquare => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
                let mut topo =
                    Topology::random_square(&relay_ids, self.side, self.range, &mut rng);
                topo.place(GATEWAY_ID, self.side / 2.0, self.side / 2.0);
                topo
            }
        }
        .with_delay(self.delay)
        .with_loss_rate(self.loss_rate);

        let config = Config::new(GATEWAY_ID, source, relay_ids.clone())
            .with_hello_interval(self.hello_interval)
            .with_traffic_interval(self.traffic_interval)
            .with_duty_cycle(self.duty_cycle);

        let mut sim = Simulator::new(config, topology, self.side * self.side, self.seed)?;
        if let Some(interval) = self.snapshot_interval {
            sim = sim.with_snapshot_interval(interval);
        }

        info!(
            relays = self.relays,
            seed = self.seed,
            range = self.range,
            side = self.side,
            "scenario built"
        );
        Ok((sim, relay_ids))
    }

    /// Build and run for the given simulated duration.
    pub fn run_for(self, duration: Duration) -> Result<SimulationResult, ScenarioError> {
        let (mut sim, _) = self.build()?;
        Ok(sim.run_for(duration))
    }
}

/// A source-relays-gateway chain where only adjacent nodes are in range,
/// with duty cycling off; the smallest deterministic delivery scenario.
pub fn line_scenario(relays: usize) -> ScenarioBuilder {
    ScenarioBuilder::new(relays)
        .line_placement(60.0)
        .with_range(80.0)
        .without_duty_cycle()
}
