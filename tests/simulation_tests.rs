//! End-to-end runs on the bundled demo map.

use std::path::PathBuf;

use hemoflow::{Circuit, ParticleClass, Simulation, SimulationParameters, TraceWriter};

fn demo_map() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/vasculature.csv")
}

#[test]
fn test_demo_map_is_fully_connected() {
    let params = SimulationParameters::default();
    let circuit = Circuit::from_csv(demo_map(), &params).unwrap();
    assert_eq!(circuit.len(), 8);
    for id in circuit.ids().collect::<Vec<_>>() {
        let (first, _) = circuit.segment(id).unwrap().successors();
        assert!(first.is_some(), "demo vessel {} must have a successor", id);
    }
}

#[test]
fn test_full_run_with_trace_export() {
    let params = SimulationParameters::default();
    let circuit = Circuit::from_csv(demo_map(), &params).unwrap();

    let dir = std::env::temp_dir().join(format!("hemoflow_e2e_{}", std::process::id()));
    let mut trace = TraceWriter::new(&dir, &params.sensor_vessel_ids).unwrap();

    let mut simulation = Simulation::new(circuit, params, Some(7));
    simulation.inject_nanobots(30, 1, &mut trace);
    simulation.add_infection_source(1, 5.0);
    let summary = simulation.run(20.0, &mut trace);
    let path = trace.finish().unwrap();

    assert!(summary.ticks > 0);
    assert_eq!(summary.bursts, 5);
    assert_eq!(summary.biomarkers_released, 500);
    assert_eq!(simulation.circuit().population(ParticleClass::Nanobot), 30);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.lines().count() > 30, "trace must carry per-tick rows");
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let params = SimulationParameters::default();

    let first = {
        let circuit = Circuit::from_csv(demo_map(), &params).unwrap();
        let mut simulation = Simulation::new(circuit, params.clone(), Some(1234));
        simulation.inject_nanobots(25, 1, &mut ());
        simulation.run(40.0, &mut ());
        simulation
    };
    let second = {
        let circuit = Circuit::from_csv(demo_map(), &params).unwrap();
        let mut simulation = Simulation::new(circuit, params.clone(), Some(1234));
        simulation.inject_nanobots(25, 1, &mut ());
        simulation.run(40.0, &mut ());
        simulation
    };

    for id in first.circuit().ids().collect::<Vec<_>>() {
        let a = first.circuit().segment(id).unwrap();
        let b = second.circuit().segment(id).unwrap();
        assert_eq!(
            a.count(ParticleClass::Nanobot),
            b.count(ParticleClass::Nanobot),
            "vessel {} populations diverged under the same seed",
            id
        );
        for lane in 0..a.lane_count() {
            let pa: Vec<_> = a.lane(lane).iter(ParticleClass::Nanobot).map(|p| p.position).collect();
            let pb: Vec<_> = b.lane(lane).iter(ParticleClass::Nanobot).map(|p| p.position).collect();
            assert_eq!(pa, pb, "vessel {} lane {} trajectories diverged", id, lane);
        }
    }
}
