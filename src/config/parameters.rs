//! Parameter structures for a simulation run.
//!
//! Everything tunable lives here and loads from JSON with safe defaults, so
//! a missing or broken parameter file never aborts a run.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level parameters container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Width of a vessel; lane offsets span half of it.
    pub vessel_width: f64,
    /// Mobility step interval Δt in seconds.
    pub delta_t: f64,
    /// Whether particles may change lanes inside organs.
    pub lane_change_enabled: bool,
    /// Number of sub-groups nanobot injection spreads over.
    pub injection_group_size: u32,
    /// Biomarker burst settings.
    pub burst: BurstParameters,
    /// Routing bias applied during transposition.
    pub routing_bias: RoutingBias,
    /// Vessels acting as biomarker sensors for the per-second aggregate.
    pub sensor_vessel_ids: Vec<u32>,
    /// Distance threshold for proximity queries between biomarkers and
    /// nanobot receivers.
    pub communication_range: f64,
    /// Gateway positions, passed through to the communication layer.
    pub gateway_positions: Vec<i32>,
    /// Tissue IDs carried by injected nanobots, passed through to the
    /// communication layer.
    pub tissue_ids: Vec<i32>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            vessel_width: 0.25,
            delta_t: 1.0,
            lane_change_enabled: true,
            injection_group_size: 10,
            burst: BurstParameters::default(),
            routing_bias: RoutingBias::default(),
            sensor_vessel_ids: vec![94, 75, 74, 67, 66],
            communication_range: 0.001,
            gateway_positions: Vec::new(),
            tissue_ids: Vec::new(),
        }
    }
}

impl SimulationParameters {
    /// Loads parameters from a JSON file, or returns defaults if the file
    /// is missing or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("loaded simulation parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("failed to parse simulation parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("simulation parameters file not found, using defaults");
                Self::default()
            }
        }
    }
}

/// Settings of one biomarker release burst.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstParameters {
    /// Biomarkers released per burst.
    pub intensity: u32,
    /// Sub-groups a burst is spread over along the vessel direction.
    pub group_size: u32,
    /// Seconds between bursts from one source vessel.
    pub interval_secs: f64,
    /// Biomarker diameter in µm.
    pub biomarker_size_um: f64,
    /// Seconds a biomarker stays active after release.
    pub active_duration_secs: f64,
}

impl Default for BurstParameters {
    fn default() -> Self {
        Self {
            intensity: 100,
            group_size: 4,
            interval_secs: 1.0,
            biomarker_size_um: 10.0,
            active_duration_secs: 60.0,
        }
    }
}

/// Data-driven transposition bias table, keyed by vessel ID.
///
/// The lists are map-specific anatomy: when a branch
/// (successor #2) feeds an organ, a quarter of the traffic that would take
/// it is pushed back onto the main path; when the main path (successor #1)
/// is itself an organ vessel, a quarter of the main-path traffic is pulled
/// onto it. Whether these lists are exhaustive for a given vasculature is a
/// property of the map, so they are configuration, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingBias {
    /// Vessels whose branch delivers blood toward an organ.
    pub organ_feeder_ids: Vec<u32>,
    /// Organ vessels lying on a main path.
    pub organ_vessel_ids: Vec<u32>,
}

impl Default for RoutingBias {
    fn default() -> Self {
        Self {
            organ_feeder_ids: vec![6, 32, 35],
            organ_vessel_ids: vec![3, 7, 12, 24, 25, 37, 43, 45],
        }
    }
}

impl RoutingBias {
    pub fn is_organ_feeder(&self, vessel: u32) -> bool {
        self.organ_feeder_ids.contains(&vessel)
    }

    pub fn is_organ_vessel(&self, vessel: u32) -> bool {
        self.organ_vessel_ids.contains(&vessel)
    }
}
