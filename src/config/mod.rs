//! Simulation parameter loading.

mod parameters;

pub use parameters::{BurstParameters, RoutingBias, SimulationParameters};
