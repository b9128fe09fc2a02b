//! Motion-engine tests: per-tick translation, the single-move invariant,
//! and end-of-segment detection.

use glam::DVec3;
use hemoflow::{
    Circuit, Particle, ParticleClass, SimTime, Simulation, SimulationParameters, VesselRecord, VesselType,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn artery(id: u32, start: DVec3, stop: DVec3) -> VesselRecord {
    VesselRecord { id, vessel_type: VesselType::Artery, start, stop }
}

fn two_segment_circuit() -> Circuit {
    // A: length 10 at angle 0, B: long runway so nothing leaves it
    let records = vec![
        artery(1, DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)),
        artery(2, DVec3::new(10.0, 0.0, 0.0), DVec3::new(1010.0, 0.0, 0.0)),
    ];
    Circuit::from_records(&records, &SimulationParameters::default()).unwrap()
}

// ============================================================================
// Translation
// ============================================================================

#[test]
fn test_translate_moves_along_segment_direction() {
    let mut circuit = two_segment_circuit();
    let segment = circuit.segment_mut(2).unwrap();
    segment.add_to_lane(0, Particle::nanobot(1, DVec3::new(10.0, 0.0, 0.0)));

    let mut rng = StdRng::seed_from_u64(11);
    let now = SimTime::from_secs(1.0);
    let out = segment.step(ParticleClass::Nanobot, now, &mut rng, &mut ());
    assert!(out.reached_end.is_empty());

    let moved = segment.lane(0).get(ParticleClass::Nanobot, 0);
    let travelled = moved.position.x - 10.0;
    // lane 0 velocity is 10; jitter is at most 11%
    assert!(
        (8.9..=11.1).contains(&travelled),
        "travel distance {} outside the jitter envelope",
        travelled
    );
    assert_eq!(moved.position.y, 0.0);
    assert_eq!(moved.last_move, now);
}

#[test]
fn test_end_of_segment_scenario() {
    // artery of length 10, lane velocity 10, entity at x=9.5: one tick must
    // push it past the end and into the successor, whatever the jitter
    let mut circuit = two_segment_circuit();
    circuit
        .segment_mut(1)
        .unwrap()
        .add_to_lane(0, Particle::nanobot(1, DVec3::new(9.5, 0.0, 0.0)));

    let mut rng = StdRng::seed_from_u64(5);
    let now = SimTime::from_secs(1.0);
    let out = circuit
        .segment_mut(1)
        .unwrap()
        .step(ParticleClass::Nanobot, now, &mut rng, &mut ());
    assert_eq!(out.reached_end.len(), 1, "entity must pass segment end");

    let params = SimulationParameters::default();
    let stats = circuit.transpose(1, out.reached_end, now, &params.routing_bias, &mut rng, &mut ());
    assert_eq!(stats.delivered, 1);

    assert_eq!(circuit.segment(1).unwrap().count(ParticleClass::Nanobot), 0);
    let successor = circuit.segment(2).unwrap();
    assert_eq!(successor.count(ParticleClass::Nanobot), 1);
    let landed = successor.lane(0).get(ParticleClass::Nanobot, 0);
    assert!(
        landed.position.x >= 10.0,
        "entity must sit past the successor's start, got {}",
        landed.position.x
    );
}

#[test]
fn test_single_move_per_tick_across_handoff() {
    // vessel 2 ticks after vessel 1 at the same timestamp; an entity handed
    // from 1 to 2 must not be moved again by 2's own tick
    let mut circuit = two_segment_circuit();
    circuit
        .segment_mut(1)
        .unwrap()
        .add_to_lane(0, Particle::nanobot(1, DVec3::new(9.5, 0.0, 0.0)));

    let mut simulation = Simulation::new(circuit, SimulationParameters::default(), Some(42));
    simulation.run(1.0, &mut ());

    let successor = simulation.circuit().segment(2).unwrap();
    assert_eq!(successor.count(ParticleClass::Nanobot), 1);
    let landed = successor.lane(0).get(ParticleClass::Nanobot, 0);
    // one move from x=9.5 plus the rescaled residual can reach at most
    // 10 + (11.1 - 0.5) = 20.6; a double move would overshoot far past it
    assert!(
        landed.position.x <= 20.6 + 1e-9,
        "entity moved more than once in a tick, x = {}",
        landed.position.x
    );
    assert_eq!(landed.last_move, SimTime::from_secs(1.0));
}

#[test]
fn test_warm_up_tick_moves_nothing() {
    let mut circuit = two_segment_circuit();
    circuit
        .segment_mut(1)
        .unwrap()
        .add_to_lane(0, Particle::nanobot(1, DVec3::new(5.0, 0.0, 0.0)));

    let mut simulation = Simulation::new(circuit, SimulationParameters::default(), Some(1));
    simulation.run(0.0, &mut ());

    let segment = simulation.circuit().segment(1).unwrap();
    let bot = segment.lane(0).get(ParticleClass::Nanobot, 0);
    assert_eq!(bot.position.x, 5.0, "first tick is a warm-up, nothing moves");
}

// ============================================================================
// Conservation
// ============================================================================

#[test]
fn test_nanobot_conservation_over_many_ticks() {
    let records = vec![
        artery(1, DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0)),
        artery(2, DVec3::new(10.0, 0.0, 0.0), DVec3::new(10.0, 10.0, 0.0)),
        VesselRecord {
            id: 3,
            vessel_type: VesselType::Vein,
            start: DVec3::new(10.0, 10.0, 0.0),
            stop: DVec3::new(0.0, 10.0, 0.0),
        },
        VesselRecord {
            id: 4,
            vessel_type: VesselType::Vein,
            start: DVec3::new(0.0, 10.0, 0.0),
            stop: DVec3::ZERO,
        },
    ];
    let circuit = Circuit::from_records(&records, &SimulationParameters::default()).unwrap();
    let mut simulation = Simulation::new(circuit, SimulationParameters::default(), Some(99));
    simulation.inject_nanobots(50, 1, &mut ());
    assert_eq!(simulation.circuit().population(ParticleClass::Nanobot), 50);

    let summary = simulation.run(30.0, &mut ());
    assert_eq!(
        simulation.circuit().population(ParticleClass::Nanobot),
        50,
        "nanobots must never be duplicated or dropped"
    );
    assert_eq!(summary.handoffs.dropped, 0);
}
