//! Cross-vessel handoff of particles that passed the end of a segment.
//!
//! Implemented as an iterative work list: a particle that overshoots its
//! destination in the same tick goes back on the list against the new
//! segment, so a single fast tick can carry it across several short
//! vessels without recursion.

use rand::rngs::StdRng;
use rand::Rng;

use super::Circuit;
use crate::config::RoutingBias;
use crate::entity::Particle;
use crate::export::TraceSink;
use crate::scheduler::SimTime;
use crate::vessel::translate_position;

/// Outcome of one handoff batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HandoffStats {
    /// Particles placed into a successor lane.
    pub delivered: usize,
    /// Biomarkers that expired before completing the handoff.
    pub expired: usize,
    /// Particles dropped because the source segment had no successor.
    pub dropped: usize,
}

impl Circuit {
    /// Hands every particle in `work` to a successor of its source segment.
    ///
    /// Routing draws a choice in [0, 4): {0, 1} take the branch (successor
    /// #2) when one exists, {2, 3} the main path. The bias table remaps
    /// 1→2 when the branch feeds an organ and 2→1 when the main path is an
    /// organ vessel, giving organ junctions a 75/25-style split.
    /// The residual travel distance past the old end is rescaled by the
    /// destination/source lane velocity ratio. Expiry is re-checked before
    /// every hop.
    pub fn transpose(
        &mut self,
        from: u32,
        batch: Vec<Particle>,
        now: SimTime,
        bias: &RoutingBias,
        rng: &mut StdRng,
        trace: &mut dyn TraceSink,
    ) -> HandoffStats {
        let mut stats = HandoffStats::default();
        let mut work: Vec<(u32, Particle)> = batch.into_iter().map(|p| (from, p)).collect();

        while let Some((from_id, particle)) = work.pop() {
            if particle.expired(now) {
                log::info!("biomarker {} expired in vessel {}", particle.id, from_id);
                trace.record(&particle, from_id, now);
                stats.expired += 1;
                continue;
            }

            let Some(source) = self.segments.get(&from_id) else {
                log::error!("handoff from unknown vessel {}, particle {} dropped", from_id, particle.id);
                stats.dropped += 1;
                continue;
            };
            let (succ1, succ2) = source.successors();
            let Some(succ1) = succ1 else {
                log::error!("vessel {} has no successor, particle {} dropped", from_id, particle.id);
                stats.dropped += 1;
                continue;
            };
            let from_stop = source.stop();
            let from_velocity = source.lane_velocity(particle.lane);

            let mut choice: u32 = rng.gen_range(0..4);
            if let Some(branch) = succ2 {
                if bias.is_organ_feeder(branch) && choice == 1 {
                    choice = 2;
                }
            }
            if bias.is_organ_vessel(succ1) && choice == 2 {
                choice = 1;
            }
            let dest_id = match (succ2, choice) {
                (Some(branch), 0 | 1) => branch,
                _ => succ1,
            };

            let Some(dest) = self.segments.get(&dest_id) else {
                log::error!("successor {} of vessel {} not in circuit, particle {} dropped", dest_id, from_id, particle.id);
                stats.dropped += 1;
                continue;
            };
            let ctx = dest.motion();
            let dest_velocity = dest.lane_velocity(particle.lane);

            // residual distance past the old end, rescaled to the new
            // segment's lane velocity
            let residual = particle.position.distance(from_stop) / from_velocity * dest_velocity;

            let mut particle = particle;
            particle.position = translate_position(ctx.start, residual, ctx.angle_deg, ctx.vessel_type, from_stop.z);

            if ctx.exceeds_after_handoff(particle.position) {
                work.push((dest_id, particle));
            } else {
                let lane = particle.lane;
                let dest = self.segments.get_mut(&dest_id).expect("looked up above");
                let stored = dest.add_to_lane(lane, particle);
                trace.record(stored, dest_id, now);
                stats.delivered += 1;
            }
        }
        stats
    }
}
