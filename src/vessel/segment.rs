//! A directed vessel segment and its per-tick motion phases.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;

use super::motion::{translate_position, MotionContext};
use super::Lane;
use crate::entity::{Particle, ParticleClass, ParticleId};
use crate::export::TraceSink;
use crate::geometry::{max_offset_units, VesselRecord, VesselType, LANE_PROFILE};
use crate::scheduler::SimTime;

/// Length assigned to a segment whose endpoints coincide in the plane, so
/// its particles are not ejected on the first tick.
const DEGENERATE_LENGTH: f64 = 10_000.0;

/// Fixed traversal length of organ segments.
const ORGAN_LENGTH: f64 = 4.0;

/// Result of one motion pass over one particle class.
#[derive(Debug, Default)]
pub struct StepOutput {
    /// Particles that passed the end of the segment, removed from their
    /// lane (offset stripped, lane index retained) and awaiting handoff.
    pub reached_end: Vec<Particle>,
    /// Biomarkers removed because they expired this tick.
    pub expired: usize,
}

/// One directed edge of the circulatory graph.
///
/// Owns its lanes and geometry. Successor links are held as IDs only; the
/// circuit resolves them, so a segment never mutates a peer directly.
#[derive(Debug)]
pub struct Segment {
    id: u32,
    vessel_type: VesselType,
    start: DVec3,
    stop: DVec3,
    length: f64,
    angle_deg: f64,
    delta_t: f64,
    lanes: Vec<Lane>,
    successors: [Option<u32>; 2],
    lane_change_enabled: bool,
    running: bool,
    /// Alternating-tick toggles for the lane-change phase, one per class.
    change_phase: [bool; 2],
}

impl Segment {
    pub fn new(record: &VesselRecord, vessel_width: f64, delta_t: f64, lane_change_enabled: bool) -> Self {
        let angle_deg = {
            let delta = record.stop - record.start;
            delta.y.atan2(delta.x).to_degrees()
        };
        let length = match record.vessel_type {
            VesselType::Organ => ORGAN_LENGTH,
            _ => {
                let delta = record.stop - record.start;
                let planar = (delta.x * delta.x + delta.y * delta.y).sqrt();
                if planar <= 0.0 {
                    DEGENERATE_LENGTH
                } else {
                    planar
                }
            }
        };

        let base_velocity = record.vessel_type.base_velocity();
        let unit_scale = vessel_width / 2.0 / max_offset_units() as f64;
        let lanes = LANE_PROFILE
            .iter()
            .enumerate()
            .map(|(i, profile)| Lane::new(i, profile, base_velocity, angle_deg, unit_scale))
            .collect();

        Self {
            id: record.id,
            vessel_type: record.vessel_type,
            start: record.start,
            stop: record.stop,
            length,
            angle_deg,
            delta_t,
            lanes,
            successors: [None, None],
            lane_change_enabled,
            running: false,
            change_phase: [false, false],
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn vessel_type(&self) -> VesselType {
        self.vessel_type
    }

    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn stop(&self) -> DVec3 {
        self.stop
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, idx: usize) -> &Lane {
        &self.lanes[idx]
    }

    pub fn lane_velocity(&self, idx: usize) -> f64 {
        self.lanes[idx].velocity()
    }

    pub fn successors(&self) -> (Option<u32>, Option<u32>) {
        (self.successors[0], self.successors[1])
    }

    /// Links a successor segment by ID. Returns false once both slots are
    /// taken (a third coordinate match is ignored).
    pub fn add_successor(&mut self, id: u32) -> bool {
        for slot in &mut self.successors {
            if slot.is_none() {
                *slot = Some(id);
                return true;
            }
        }
        false
    }

    pub fn motion(&self) -> MotionContext {
        MotionContext {
            angle_deg: self.angle_deg,
            vessel_type: self.vessel_type,
            start: self.start,
            stop: self.stop,
            length: self.length,
        }
    }

    pub fn is_empty(&self, class: ParticleClass) -> bool {
        self.lanes.iter().all(|lane| lane.is_empty(class))
    }

    pub fn count(&self, class: ParticleClass) -> usize {
        self.lanes.iter().map(|lane| lane.count(class)).sum()
    }

    /// Consumes the warm-up tick: the first invocation marks the segment
    /// running and moves nothing.
    pub fn warm_up(&mut self) -> bool {
        if self.running {
            false
        } else {
            self.running = true;
            true
        }
    }

    /// Adds a particle to a lane, applying the lane offset. An invalid lane
    /// index is a configuration error: logged, and the particle is placed in
    /// lane 0 instead of being lost.
    pub fn add_to_lane(&mut self, lane: usize, particle: Particle) -> &Particle {
        let lane = if lane < self.lanes.len() {
            lane
        } else {
            log::warn!("vessel {}: invalid lane index {}, using lane 0", self.id, lane);
            0
        };
        self.lanes[lane].push(particle)
    }

    /// Runs one motion pass for one particle class: optional lane change,
    /// then translation. Particles past the end are returned for handoff;
    /// expired biomarkers are removed here, reported to the trace, and
    /// counted.
    pub fn step(
        &mut self,
        class: ParticleClass,
        now: SimTime,
        rng: &mut StdRng,
        trace: &mut dyn TraceSink,
    ) -> StepOutput {
        let mut out = StepOutput::default();
        if self.is_empty(class) {
            return out;
        }

        // lane changing happens only inside organs, every other tick
        let phase = &mut self.change_phase[class_index(class)];
        *phase = !*phase;
        let change_now = !*phase;
        if change_now && self.lane_change_enabled && self.vessel_type == VesselType::Organ {
            self.change_lanes(class, rng);
        }

        self.translate(class, now, rng, trace, &mut out);
        out
    }

    fn translate(
        &mut self,
        class: ParticleClass,
        now: SimTime,
        rng: &mut StdRng,
        trace: &mut dyn TraceSink,
        out: &mut StepOutput,
    ) {
        let ctx = self.motion();
        let dt = self.delta_t;
        for lane_idx in 0..self.lanes.len() {
            let velocity = self.lanes[lane_idx].velocity();
            let mut j = 0;
            while j < self.lanes[lane_idx].count(class) {
                // skip particles already translated by another vessel
                // this tick
                if self.lanes[lane_idx].get(class, j).last_move >= now {
                    j += 1;
                    continue;
                }
                if self.lanes[lane_idx].get(class, j).expired(now) {
                    let expired = self.lanes[lane_idx].remove_at(class, j);
                    log::info!("biomarker {} expired in vessel {}", expired.id, self.id);
                    trace.record(&expired, self.id, now);
                    out.expired += 1;
                    continue;
                }

                let jitter_percent = rng.gen_range(0..=11) as f64;
                let backward = rng.gen_bool(0.5);
                let distance = if backward {
                    (velocity - velocity / 100.0 * jitter_percent) * dt
                } else {
                    (velocity + velocity / 100.0 * jitter_percent) * dt
                };

                let particle = self.lanes[lane_idx].get_mut(class, j);
                particle.position =
                    translate_position(particle.position, distance, ctx.angle_deg, ctx.vessel_type, ctx.start.z);
                particle.last_move = now;

                if ctx.exceeds(particle.position) {
                    out.reached_end.push(self.lanes[lane_idx].remove_at(class, j));
                } else {
                    trace.record(self.lanes[lane_idx].get(class, j), self.id, now);
                    j += 1;
                }
            }
        }
    }

    /// Flags half of the particles at random, then shifts the flagged ones
    /// one lane over. Edge lanes always move inward; everyone else picks a
    /// uniform random direction. Destination lanes are re-sorted by ID.
    fn change_lanes(&mut self, class: ParticleClass, rng: &mut StdRng) {
        if self.lanes.len() <= 1 {
            return;
        }
        for lane in &mut self.lanes {
            for particle in lane.iter_mut(class) {
                if rng.gen_bool(0.5) {
                    particle.should_change_lane = true;
                }
            }
        }
        for i in 0..self.lanes.len() {
            let mut direction: i64 = if rng.gen_bool(0.5) { -1 } else { 1 };
            if i == 0 {
                direction = 1;
            } else if i + 1 >= self.lanes.len() {
                direction = -1;
            }
            let dest = i as i64 + direction;
            if dest < 0 || dest as usize >= self.lanes.len() {
                log::warn!("vessel {}: lane change to invalid lane {} skipped", self.id, dest);
                continue;
            }
            self.move_flagged(class, i, dest as usize);
        }
    }

    fn move_flagged(&mut self, class: ParticleClass, from: usize, to: usize) {
        let mut j = 0;
        while j < self.lanes[from].count(class) {
            if self.lanes[from].get(class, j).should_change_lane {
                let mut particle = self.lanes[from].remove_at(class, j);
                particle.should_change_lane = false;
                self.lanes[to].push(particle);
            } else {
                j += 1;
            }
        }
        self.lanes[to].sort_by_id(class);
    }

    /// Returns the IDs of all nanobots in the particle's own lane within
    /// `radius` (3-D Euclidean distance). Other lanes are not scanned.
    pub fn nearby_receivers(&self, particle: &Particle, radius: f64) -> Vec<u32> {
        let Some(lane) = self.lanes.get(particle.lane) else {
            log::warn!("vessel {}: proximity query for unknown lane {}", self.id, particle.lane);
            return Vec::new();
        };
        lane.iter(ParticleClass::Nanobot)
            .filter(|bot| bot.position.distance(particle.position) <= radius)
            .filter_map(|bot| match bot.id {
                ParticleId::Bot(id) => Some(id),
                ParticleId::Marker(_) => None,
            })
            .collect()
    }
}

fn class_index(class: ParticleClass) -> usize {
    match class {
        ParticleClass::Nanobot => 0,
        ParticleClass::Biomarker => 1,
    }
}
