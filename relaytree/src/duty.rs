//! Duty-cycle controller: randomized up/down alternation of relay uplinks.
//!
//! Models intermittent, disaster-degraded connectivity. Each relay's
//! interface alternates between up and down, dwelling for exponentially
//! distributed durations with separate configured means. The controller
//! does not coordinate with discovery or forwarding; the transport enforces
//! that a downed interface receives nothing.

use crate::debug::DebugEvent;
use crate::mesh::Mesh;
use crate::time::Timestamp;
use crate::traits::{Random, Timers, Transport};
use crate::types::{NodeId, Timer};

impl<R: Random> Mesh<R> {
    /// Apply a duty-cycle transition and schedule the opposite one.
    pub(crate) fn switch_interface<E: Timers + Transport>(
        &mut self,
        env: &mut E,
        node: NodeId,
        up: bool,
        now: Timestamp,
    ) {
        let was_up = env.is_interface_up(node);
        env.set_interface_up(node, up);
        self.emit(DebugEvent::InterfaceSwitched {
            timestamp: now,
            node,
            was_up,
            up,
        });

        let Some(duty) = self.config.duty_cycle else {
            return;
        };
        let mean = if up { duty.mean_on } else { duty.mean_off };
        let dwell = self.random.exp_duration(mean);
        env.schedule(dwell, Timer::DutyToggle { node, up: !up });
    }
}
