//! The simulation driver: wires the circuit to the event queue and the
//! owned random source, and dispatches ticks until the stop time.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Circuit, HandoffStats};
use crate::config::SimulationParameters;
use crate::entity::ParticleClass;
use crate::export::TraceSink;
use crate::scheduler::{Event, EventQueue, SimTime};

/// Aggregate counters of one finished run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub ticks: u64,
    pub bursts: u64,
    pub biomarkers_released: u64,
    pub handoffs: HandoffStats,
    pub expired_in_lane: u64,
}

/// Owns the circuit, the event queue, and the random source for one run.
///
/// Random draws all come from a single seeded `StdRng`, so a run is
/// reproducible given the same seed, map, and parameters.
pub struct Simulation {
    circuit: Circuit,
    params: SimulationParameters,
    queue: EventQueue,
    rng: StdRng,
    summary: RunSummary,
}

impl Simulation {
    pub fn new(circuit: Circuit, params: SimulationParameters, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut queue = EventQueue::new();
        // every segment schedules itself from t=0 onward
        let ids: Vec<u32> = circuit.ids().collect();
        for vessel in ids {
            queue.push(SimTime::ZERO, Event::Tick { vessel });
        }
        Self { circuit, params, queue, rng, summary: RunSummary::default() }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Injects the starting nanobot population at time zero.
    pub fn inject_nanobots(&mut self, count: u32, vessel: u32, trace: &mut dyn TraceSink) {
        self.circuit.inject_nanobots(
            count,
            vessel,
            self.params.injection_group_size,
            SimTime::ZERO,
            &mut self.rng,
            trace,
        );
    }

    /// Registers an infection-source vessel: one immediate burst plus a
    /// repeating burst every interval until `duration_secs`.
    pub fn add_infection_source(&mut self, vessel: u32, duration_secs: f64) {
        if self.circuit.segment(vessel).is_none() {
            log::error!("invalid infection source vessel {}", vessel);
            return;
        }
        let interval = self.params.burst.interval_secs;
        let interval = if interval > 0.0 {
            interval
        } else {
            log::warn!("burst interval {}s is invalid, using 1s", interval);
            1.0
        };
        log::info!(
            "scheduling biomarker bursts from vessel {} every {}s until {}s",
            vessel,
            interval,
            duration_secs
        );
        self.queue.push(SimTime::ZERO, Event::Burst { vessel });
        let mut time = interval;
        while time < duration_secs {
            self.queue.push(SimTime::from_secs(time), Event::Burst { vessel });
            time += interval;
        }
    }

    /// Runs events in time order until `duration_secs` (inclusive).
    pub fn run(&mut self, duration_secs: f64, trace: &mut dyn TraceSink) -> RunSummary {
        let stop = SimTime::from_secs(duration_secs);
        while let Some((now, event)) = self.queue.pop_until(stop) {
            match event {
                Event::Tick { vessel } => self.on_tick(vessel, now, trace),
                Event::Burst { vessel } => {
                    let released = self.circuit.release_burst(
                        vessel,
                        now,
                        &self.params.burst,
                        self.params.communication_range,
                        &mut self.rng,
                        trace,
                    );
                    self.summary.bursts += 1;
                    self.summary.biomarkers_released += released as u64;
                }
            }
        }
        self.summary
    }

    /// One mobility step of one segment: nanobot pass, then biomarker pass,
    /// each followed by the handoff of particles that passed the end. The
    /// segment always reschedules itself one Δt later, including warm-up
    /// and empty no-op ticks.
    fn on_tick(&mut self, vessel: u32, now: SimTime, trace: &mut dyn TraceSink) {
        let Some(segment) = self.circuit.segment_mut(vessel) else {
            log::error!("tick for unknown vessel {}", vessel);
            return;
        };
        let dt = segment.delta_t();
        self.summary.ticks += 1;

        if !segment.warm_up() {
            for class in [ParticleClass::Nanobot, ParticleClass::Biomarker] {
                let out = {
                    let segment = self.circuit.segment_mut(vessel).expect("checked above");
                    segment.step(class, now, &mut self.rng, trace)
                };
                self.summary.expired_in_lane += out.expired as u64;
                if !out.reached_end.is_empty() {
                    let stats = self.circuit.transpose(
                        vessel,
                        out.reached_end,
                        now,
                        &self.params.routing_bias,
                        &mut self.rng,
                        trace,
                    );
                    self.summary.handoffs.delivered += stats.delivered;
                    self.summary.handoffs.expired += stats.expired;
                    self.summary.handoffs.dropped += stats.dropped;
                }
            }
        }
        self.queue.push(now + dt, Event::Tick { vessel });
    }
}
