//! Hemoflow - vascular flow and transposition engine
//!
//! Simulates the transport of mobile particles (nanobots and biomarkers)
//! through a graph of blood-vessel segments, as a substrate for studying
//! molecular-communication-based infection detection. Each vessel carries
//! 21 parallel lanes; a discrete tick moves every particle along its lane,
//! optionally shuffles lanes inside organs, and hands particles that pass
//! the end of a vessel to a successor segment.

pub mod circuit;
pub mod config;
pub mod entity;
pub mod export;
pub mod geometry;
pub mod scheduler;
pub mod vessel;

pub use circuit::{Circuit, RunSummary, Simulation};
pub use config::{BurstParameters, RoutingBias, SimulationParameters};
pub use entity::{BiomarkerData, Particle, ParticleClass, ParticleId, Payload};
pub use export::{SensorCounter, TraceSink, TraceWriter};
pub use geometry::{load_vessel_records, VesselRecord, VesselType};
pub use scheduler::SimTime;
pub use vessel::{Lane, Segment};
