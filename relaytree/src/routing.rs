//! Forwarding engine: replicate along believed tree edges, repair by
//! reversing incoming edges when a node has lost its own route.
//!
//! Forwarding floods a copy of the frame to every out-neighbor rather than
//! picking a single path; under topology churn that trades bandwidth for
//! delivery robustness, and the gateway deduplicates by sequence number.
//!
//! When a node has no out-neighbors it re-parents: every node that still
//! names it as a next hop relinquishes that edge, reversed to point the
//! other way. Repair is best effort; it can lengthen paths and transiently
//! create cycles, and finds nothing when the node has no incoming edges.

use crate::debug::DebugEvent;
use crate::mesh::Mesh;
use crate::time::Timestamp;
use crate::traits::{Random, Transport};
use crate::types::NodeId;

impl<R: Random> Mesh<R> {
    /// Relay a data frame arriving at `local` toward the gateway.
    pub(crate) fn forward_data<E: Transport>(
        &mut self,
        env: &mut E,
        local: NodeId,
        frame: &[u8],
        now: Timestamp,
    ) {
        // Bounded retry so a repair that never yields a route terminates.
        let max_rounds = self.config.relays.len() + 1;
        for _ in 0..=max_rounds {
            let hops = self.graph.out_neighbors(local);
            if !hops.is_empty() {
                let copies = hops.len();
                for &hop in hops {
                    env.send(local, hop, frame);
                }
                self.emit(DebugEvent::DataForwarded {
                    from: local,
                    copies,
                });
                return;
            }

            let donors = self.graph.incoming_edges(local);
            if donors.is_empty() {
                break;
            }
            for (donor, _) in donors {
                self.graph.remove_edge(donor, local);
                self.graph.add_edge(local, donor);
                self.emit(DebugEvent::EdgeReversed {
                    timestamp: now,
                    donor,
                    orphan: local,
                });
            }
        }

        self.no_route_drops += 1;
        self.emit(DebugEvent::DataDropped {
            node: local,
            reason: "no route",
        });
    }
}
