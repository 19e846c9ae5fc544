//! Directed forwarding graph shared by the whole mesh.
//!
//! Each key maps a node to the ordered list of next hops it currently
//! believes lead toward the gateway. The graph is soft state: edges are
//! created and refreshed by Hello traffic and reclaimed by expiry timers.
//! A node that is absent as a key simply has no out-neighbors.
//!
//! The graph is expected to stay acyclic, but the repair heuristic in the
//! forwarding engine can transiently introduce cycles; see
//! [`TopologyGraph::reaches`] for the diagnostic used to observe that.

use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};

use crate::types::NodeId;

/// Per-node out-neighbor lists, keyed by the owning node.
#[derive(Clone, Debug, Default)]
pub struct TopologyGraph {
    edges: HashMap<NodeId, Vec<NodeId>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// Add the edge `local -> remote`. Returns false without modifying the
    /// graph when the edge already exists or would be a self-loop.
    pub fn add_edge(&mut self, local: NodeId, remote: NodeId) -> bool {
        if local == remote {
            return false;
        }
        let list = self.edges.entry(local).or_default();
        if list.contains(&remote) {
            return false;
        }
        list.push(remote);
        true
    }

    /// Remove the edge `local -> remote`. Returns false when absent.
    pub fn remove_edge(&mut self, local: NodeId, remote: NodeId) -> bool {
        let Some(list) = self.edges.get_mut(&local) else {
            return false;
        };
        let Some(index) = list.iter().position(|&n| n == remote) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.edges.remove(&local);
        }
        true
    }

    pub fn has_edge(&self, local: NodeId, remote: NodeId) -> bool {
        self.edges
            .get(&local)
            .is_some_and(|list| list.contains(&remote))
    }

    /// Current out-neighbors of `local`, in insertion order.
    pub fn out_neighbors(&self, local: NodeId) -> &[NodeId] {
        self.edges.get(&local).map_or(&[], Vec::as_slice)
    }

    /// Every `(owner, index)` pair where `owner`'s list contains `candidate`,
    /// sorted by owner for deterministic iteration.
    pub fn incoming_edges(&self, candidate: NodeId) -> Vec<(NodeId, usize)> {
        let mut found: Vec<(NodeId, usize)> = self
            .edges
            .iter()
            .filter_map(|(&owner, list)| {
                list.iter()
                    .position(|&n| n == candidate)
                    .map(|index| (owner, index))
            })
            .collect();
        found.sort_unstable_by_key(|&(owner, _)| owner);
        found
    }

    /// Whether `to` is reachable from `from` along out-edges.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = alloc::vec![from];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            for &next in self.out_neighbors(node) {
                if next == to {
                    return true;
                }
                stack.push(next);
            }
        }
        false
    }

    /// Nodes that currently own at least one out-edge.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_idempotent() {
        let mut graph = TopologyGraph::new();
        assert!(graph.add_edge(1, 2));
        assert!(!graph.add_edge(1, 2));
        assert_eq!(graph.out_neighbors(1), &[2]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_refused() {
        let mut graph = TopologyGraph::new();
        assert!(!graph.add_edge(7, 7));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remove_edge_noop_when_absent() {
        let mut graph = TopologyGraph::new();
        assert!(!graph.remove_edge(1, 2));
        graph.add_edge(1, 2);
        assert!(graph.remove_edge(1, 2));
        assert!(!graph.remove_edge(1, 2));
        // Key dropped once the list empties.
        assert!(graph.is_empty());
    }

    #[test]
    fn test_out_neighbors_ordered() {
        let mut graph = TopologyGraph::new();
        graph.add_edge(1, 5);
        graph.add_edge(1, 3);
        graph.add_edge(1, 4);
        assert_eq!(graph.out_neighbors(1), &[5, 3, 4]);
        graph.remove_edge(1, 3);
        assert_eq!(graph.out_neighbors(1), &[5, 4]);
    }

    #[test]
    fn test_missing_node_has_no_neighbors() {
        let graph = TopologyGraph::new();
        assert!(graph.out_neighbors(99).is_empty());
    }

    #[test]
    fn test_incoming_edges_sorted_pairs() {
        let mut graph = TopologyGraph::new();
        graph.add_edge(5, 1);
        graph.add_edge(3, 9);
        graph.add_edge(3, 1);
        graph.add_edge(2, 1);

        let incoming = graph.incoming_edges(1);
        assert_eq!(incoming, alloc::vec![(2, 0), (3, 1), (5, 0)]);
        assert!(graph.incoming_edges(42).is_empty());
    }

    #[test]
    fn test_directed_edges_independent() {
        let mut graph = TopologyGraph::new();
        graph.add_edge(1, 2);
        assert!(graph.has_edge(1, 2));
        assert!(!graph.has_edge(2, 1));
    }

    #[test]
    fn test_reaches() {
        let mut graph = TopologyGraph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        assert!(graph.reaches(1, 3));
        assert!(graph.reaches(2, 3));
        assert!(!graph.reaches(3, 1));
        assert!(graph.reaches(4, 4));
    }

    #[test]
    fn test_reaches_handles_cycles() {
        let mut graph = TopologyGraph::new();
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(3, 1);
        assert!(graph.reaches(1, 3));
        assert!(!graph.reaches(1, 9));
    }
}
