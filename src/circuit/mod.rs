//! The circulatory graph: all vessel segments and the operations that span
//! more than one of them.

mod simulation;
mod transpose;

pub use simulation::{RunSummary, Simulation};
pub use transpose::HandoffStats;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{BurstParameters, SimulationParameters};
use crate::entity::{BiomarkerData, Particle, ParticleClass};
use crate::export::TraceSink;
use crate::geometry::{load_vessel_records, VesselRecord};
use crate::scheduler::SimTime;
use crate::vessel::Segment;

/// The vessel graph. Owns every segment; successor links are IDs resolved
/// through this map, so cross-segment handoffs go through the circuit.
#[derive(Debug)]
pub struct Circuit {
    segments: BTreeMap<u32, Segment>,
}

impl Circuit {
    /// Builds segments from geometry records and links successors. Fails if
    /// fewer than two vessels survive, since no routing graph exists then.
    pub fn from_records(records: &[VesselRecord], params: &SimulationParameters) -> Result<Self> {
        let mut segments = BTreeMap::new();
        for record in records {
            let segment = Segment::new(record, params.vessel_width, params.delta_t, params.lane_change_enabled);
            log::debug!(
                "new vessel ({}, {:?}, {} -> {})",
                record.id,
                record.vessel_type,
                record.start,
                record.stop
            );
            if segments.insert(record.id, segment).is_some() {
                log::warn!("duplicate vessel id {} in map, keeping the last", record.id);
            }
        }
        if segments.len() < 2 {
            bail!("insufficient vessels: need at least 2, got {}", segments.len());
        }
        let mut circuit = Self { segments };
        circuit.connect();
        Ok(circuit)
    }

    /// Loads a vasculature map file and builds the connected circuit.
    pub fn from_csv<P: AsRef<Path>>(path: P, params: &SimulationParameters) -> Result<Self> {
        let records = load_vessel_records(path)?;
        Self::from_records(&records, params)
    }

    /// Links segments that share endpoint coordinates: B succeeds A iff B's
    /// start equals A's stop exactly. The first match fills successor #1,
    /// the second successor #2, further matches are ignored.
    fn connect(&mut self) {
        let ids: Vec<u32> = self.segments.keys().copied().collect();
        for &a in &ids {
            let stop = self.segments[&a].stop();
            for &b in &ids {
                if a == b {
                    continue;
                }
                if self.segments[&b].start() == stop {
                    let linked = self.segments.get_mut(&a).expect("id from key set").add_successor(b);
                    if !linked {
                        log::debug!("vessel {}: more than two successors, ignoring {}", a, b);
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.keys().copied()
    }

    pub fn segment(&self, id: u32) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn segment_mut(&mut self, id: u32) -> Option<&mut Segment> {
        self.segments.get_mut(&id)
    }

    /// Total particle population of one class across every lane.
    pub fn population(&self, class: ParticleClass) -> usize {
        self.segments.values().map(|s| s.count(class)).sum()
    }

    /// Normalized direction vector of a segment, start to stop.
    fn direction_norm(segment: &Segment) -> DVec3 {
        let direction = (segment.stop() - segment.start()).normalize_or_zero();
        if direction == DVec3::ZERO {
            log::warn!(
                "vessel {} has coincident endpoints, placing groups at its start",
                segment.id()
            );
        }
        direction
    }

    /// Distributes `count` nanobots over the beginning of the injection
    /// vessel in up to `group_size` sub-groups along its direction, each on
    /// a uniformly random lane. An unknown injection vessel is clamped to
    /// the highest valid ID.
    pub fn inject_nanobots(
        &mut self,
        count: u32,
        vessel: u32,
        group_size: u32,
        now: SimTime,
        rng: &mut StdRng,
        trace: &mut dyn TraceSink,
    ) {
        let vessel = if self.segments.contains_key(&vessel) {
            vessel
        } else {
            let fallback = *self.segments.keys().next_back().expect("circuit has vessels");
            log::warn!("invalid injection vessel {}, clamping to {}", vessel, fallback);
            fallback
        };
        let segment = self.segments.get_mut(&vessel).expect("clamped to valid id");

        if count == 0 {
            return;
        }
        let group_size = if group_size == 0 {
            log::warn!("injection group size 0 is invalid, using 1");
            1
        } else {
            group_size
        };
        let interval = if count >= group_size { count / group_size } else { count };
        let direction_step = Self::direction_norm(segment) / group_size as f64;
        let start = segment.start();
        let lane_count = segment.lane_count();

        for i in 1..=count {
            let group = (i - 1) / interval;
            let lane = rng.gen_range(0..lane_count);
            let position = start + direction_step * group as f64;
            let stored = segment.add_to_lane(lane, Particle::nanobot(i, position));
            trace.record(stored, vessel, now);
        }
        log::info!("injected {} nanobots into vessel {}", count, vessel);
    }

    /// Releases one biomarker burst from an infection-source vessel and
    /// reports nanobot receivers in range of each released marker.
    ///
    /// Biomarker IDs follow the `"{index}_{release_time:.1}"` scheme, the
    /// type tag encodes the source vessel, and the payload is the source
    /// vessel ID as a 16-bit binary string.
    pub fn release_burst(
        &mut self,
        vessel: u32,
        now: SimTime,
        burst: &BurstParameters,
        communication_range: f64,
        rng: &mut StdRng,
        trace: &mut dyn TraceSink,
    ) -> usize {
        let Some(segment) = self.segments.get_mut(&vessel) else {
            log::error!("burst from unknown vessel {}", vessel);
            return 0;
        };

        let marker_type = format!("BM{}", vessel);
        let source_data = format!("{:016b}", vessel);
        let intensity = burst.intensity;
        let group_size = if burst.group_size == 0 {
            log::warn!("burst group size 0 is invalid, using 1");
            1
        } else {
            burst.group_size
        };
        let interval = if intensity >= group_size { intensity / group_size } else { intensity };
        if interval == 0 {
            return 0;
        }
        let direction_step = Self::direction_norm(segment) / group_size as f64;
        let start = segment.start();
        let lane_count = segment.lane_count();

        let mut released = Vec::with_capacity(intensity as usize);
        for i in 0..intensity {
            let group = i.saturating_sub(1) / interval;
            let lane = rng.gen_range(0..lane_count);
            let position = start + direction_step * group as f64;
            let data = BiomarkerData {
                size_um: burst.biomarker_size_um,
                marker_type: marker_type.clone(),
                source_data: source_data.clone(),
                created: now,
                active_duration: burst.active_duration_secs,
            };
            let id = format!("{}_{:.1}", i, now.as_secs());
            let stored = segment.add_to_lane(lane, Particle::biomarker(id, position, data));
            trace.record(stored, vessel, now);
            released.push(stored.clone());
        }

        // interface boundary to the radio layer: report which nanobots
        // could hear each released marker
        let mut reachable = 0usize;
        for marker in &released {
            let receivers = segment.nearby_receivers(marker, communication_range);
            if !receivers.is_empty() {
                log::debug!("biomarker {} sees receivers {:?}", marker.id, receivers);
                reachable += 1;
            }
        }
        log::info!(
            "released {} biomarkers from vessel {} at {} ({} with receivers in range)",
            released.len(),
            vessel,
            now,
            reachable
        );
        released.len()
    }

    /// Proximity query scoped to the particle's own lane of one vessel.
    pub fn nearby_receivers(&self, vessel: u32, particle: &Particle, radius: f64) -> Vec<u32> {
        match self.segments.get(&vessel) {
            Some(segment) => segment.nearby_receivers(particle, radius),
            None => {
                log::warn!("proximity query for unknown vessel {}", vessel);
                Vec::new()
            }
        }
    }
}
