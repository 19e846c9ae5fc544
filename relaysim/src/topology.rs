//! Static node placement and radio connectivity.
//!
//! Radio physics stay out of scope: a frame reaches every node within a
//! fixed propagation range of the sender, with a per-link delay and an
//! optional uniform loss rate. Positions are fixed for the run; mobility
//! is not modeled.

use hashbrown::HashMap;
use rand::Rng;

use relaytree::{Duration, NodeId};

/// Node positions in a square field plus propagation parameters.
#[derive(Clone, Debug)]
pub struct Topology {
    positions: HashMap<NodeId, (f64, f64)>,
    range: f64,
    delay: Duration,
    loss_rate: f64,
}

impl Topology {
    /// Create an empty topology with the given propagation range.
    pub fn new(range: f64) -> Self {
        Self {
            positions: HashMap::new(),
            range,
            delay: Duration::from_millis(1),
            loss_rate: 0.0,
        }
    }

    /// Set the per-link propagation delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the uniform packet loss rate, clamped to [0, 1].
    pub fn with_loss_rate(mut self, rate: f64) -> Self {
        self.loss_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Place nodes on a horizontal line, `spacing` apart, in slice order.
    pub fn line(nodes: &[NodeId], spacing: f64, range: f64) -> Self {
        let mut topo = Self::new(range);
        for (i, &node) in nodes.iter().enumerate() {
            topo.place(node, i as f64 * spacing, 0.0);
        }
        topo
    }

    /// Place nodes uniformly at random inside a `side x side` square.
    pub fn random_square(
        nodes: &[NodeId],
        side: f64,
        range: f64,
        rng: &mut impl Rng,
    ) -> Self {
        let mut topo = Self::new(range);
        for &node in nodes {
            let x = rng.gen::<f64>() * side;
            let y = rng.gen::<f64>() * side;
            topo.place(node, x, y);
        }
        topo
    }

    /// Set or move a node's position.
    pub fn place(&mut self, node: NodeId, x: f64, y: f64) {
        self.positions.insert(node, (x, y));
    }

    pub fn position(&self, node: NodeId) -> Option<(f64, f64)> {
        self.positions.get(&node).copied()
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn loss_rate(&self) -> f64 {
        self.loss_rate
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether two distinct placed nodes are within radio range.
    pub fn in_range(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (Some(&(ax, ay)), Some(&(bx, by))) = (self.positions.get(&a), self.positions.get(&b))
        else {
            return false;
        };
        let (dx, dy) = (ax - bx, ay - by);
        (dx * dx + dy * dy).sqrt() <= self.range
    }

    /// Nodes within range of `node`, sorted for deterministic iteration.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result: Vec<NodeId> = self
            .positions
            .keys()
            .copied()
            .filter(|&other| self.in_range(node, other))
            .collect();
        result.sort_unstable();
        result
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_line_connects_adjacent_only() {
        let topo = Topology::line(&[1, 2, 3], 60.0, 80.0);

        assert!(topo.in_range(1, 2));
        assert!(topo.in_range(2, 3));
        assert!(!topo.in_range(1, 3));
        assert_eq!(topo.neighbors(2), vec![1, 3]);
        assert_eq!(topo.neighbors(1), vec![2]);
    }

    #[test]
    fn test_unplaced_nodes_unreachable() {
        let topo = Topology::line(&[1, 2], 10.0, 100.0);
        assert!(!topo.in_range(1, 9));
        assert!(topo.neighbors(9).is_empty());
    }

    #[test]
    fn test_node_not_its_own_neighbor() {
        let topo = Topology::line(&[1, 2], 1.0, 100.0);
        assert!(!topo.in_range(1, 1));
        assert!(!topo.neighbors(1).contains(&1));
    }

    #[test]
    fn test_random_square_deterministic_per_seed() {
        let nodes = [1, 2, 3, 4, 5];
        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let topo1 = Topology::random_square(&nodes, 500.0, 150.0, &mut rng1);
        let topo2 = Topology::random_square(&nodes, 500.0, 150.0, &mut rng2);

        for &node in &nodes {
            assert_eq!(topo1.position(node), topo2.position(node));
        }
    }

    #[test]
    fn test_random_square_positions_inside_field() {
        let nodes: Vec<NodeId> = (1..=20).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let topo = Topology::random_square(&nodes, 300.0, 100.0, &mut rng);

        for &node in &nodes {
            let (x, y) = topo.position(node).unwrap();
            assert!((0.0..=300.0).contains(&x));
            assert!((0.0..=300.0).contains(&y));
        }
    }

    #[test]
    fn test_loss_rate_clamped() {
        let topo = Topology::new(100.0).with_loss_rate(1.7);
        assert_eq!(topo.loss_rate(), 1.0);
    }
}
