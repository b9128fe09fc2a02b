//! Hemoflow - Entry point
//!
//! CLI Usage:
//!   cargo run                                  # demo map, defaults
//!   cargo run -- -d 100 -n 200 -v 1 -s 2       # 100s, 200 bots, source at vessel 2
//!   cargo run -- --map data/vasculature.csv --seed 42

use std::time::Instant;

use anyhow::Result;
use hemoflow::{Circuit, Simulation, SimulationParameters, TraceWriter};

struct Args {
    duration_secs: f64,
    nanobots: u32,
    injection_vessel: u32,
    infection_sources: Vec<u32>,
    map_path: String,
    params_path: String,
    export_dir: String,
    seed: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            duration_secs: 100.0,
            nanobots: 100,
            injection_vessel: 1,
            infection_sources: Vec::new(),
            map_path: "data/vasculature.csv".to_string(),
            params_path: "data/parameters/simulation.json".to_string(),
            export_dir: "exports".to_string(),
            seed: None,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "-d" | "--duration" => {
                if i + 1 < argv.len() {
                    if let Ok(d) = argv[i + 1].parse() {
                        args.duration_secs = d;
                        i += 1;
                    }
                }
            }
            "-n" | "--bots" => {
                if i + 1 < argv.len() {
                    if let Ok(n) = argv[i + 1].parse() {
                        args.nanobots = n;
                        i += 1;
                    }
                }
            }
            "-v" | "--vessel" => {
                if i + 1 < argv.len() {
                    if let Ok(v) = argv[i + 1].parse() {
                        args.injection_vessel = v;
                        i += 1;
                    }
                }
            }
            "-s" | "--source" => {
                if i + 1 < argv.len() {
                    for part in argv[i + 1].split(',') {
                        if let Ok(id) = part.trim().parse() {
                            args.infection_sources.push(id);
                        }
                    }
                    i += 1;
                }
            }
            "--map" => {
                if i + 1 < argv.len() {
                    args.map_path = argv[i + 1].clone();
                    i += 1;
                }
            }
            "--params" => {
                if i + 1 < argv.len() {
                    args.params_path = argv[i + 1].clone();
                    i += 1;
                }
            }
            "--out" => {
                if i + 1 < argv.len() {
                    args.export_dir = argv[i + 1].clone();
                    i += 1;
                }
            }
            "--seed" => {
                if i + 1 < argv.len() {
                    if let Ok(s) = argv[i + 1].parse() {
                        args.seed = Some(s);
                        i += 1;
                    }
                }
            }
            "--help" | "-h" => {
                println!("Hemoflow");
                println!();
                println!("Usage: hemoflow [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --duration SECS   Simulated duration (default: 100)");
                println!("  -n, --bots N          Nanobots to inject (default: 100)");
                println!("  -v, --vessel ID       Injection vessel (default: 1)");
                println!("  -s, --source IDS      Infection-source vessel IDs, comma separated");
                println!("      --map PATH        Vasculature map CSV (default: data/vasculature.csv)");
                println!("      --params PATH     Parameter JSON (default: data/parameters/simulation.json)");
                println!("      --out DIR         Export directory (default: exports)");
                println!("      --seed N          Seed the random source for a reproducible run");
                println!("  -h, --help            Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }
    args
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args();
    let started = Instant::now();

    let params = SimulationParameters::load_or_default(&args.params_path);
    log::info!(
        "parameters: width {}, Δt {}, {} sensor vessels, gateways {:?}, tissues {:?}",
        params.vessel_width,
        params.delta_t,
        params.sensor_vessel_ids.len(),
        params.gateway_positions,
        params.tissue_ids
    );

    let circuit = Circuit::from_csv(&args.map_path, &params)?;
    log::info!("circuit built: {} vessels", circuit.len());

    let mut trace = TraceWriter::new(&args.export_dir, &params.sensor_vessel_ids)?;
    let mut simulation = Simulation::new(circuit, params, args.seed);

    simulation.inject_nanobots(args.nanobots, args.injection_vessel, &mut trace);
    for &source in &args.infection_sources {
        simulation.add_infection_source(source, args.duration_secs);
    }

    let summary = simulation.run(args.duration_secs, &mut trace);
    let trace_path = trace.finish()?;

    log::info!(
        "run finished: {}s simulated, {} nanobots, {:.2}s wall clock",
        args.duration_secs,
        args.nanobots,
        started.elapsed().as_secs_f64()
    );
    log::info!(
        "ticks {}, bursts {} ({} biomarkers), handoffs {} delivered / {} expired / {} dropped, {} expired in lane",
        summary.ticks,
        summary.bursts,
        summary.biomarkers_released,
        summary.handoffs.delivered,
        summary.handoffs.expired,
        summary.handoffs.dropped,
        summary.expired_in_lane
    );
    println!("injected vessel: {}", args.injection_vessel);
    println!("trace written to {}", trace_path.display());
    Ok(())
}
