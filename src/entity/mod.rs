//! Mobile entities carried by the circuit: nanobots and biomarkers.
//!
//! Both categories share one particle shape and one motion algorithm; they
//! differ only in payload and in the biomarker's expiry lifecycle.

mod particle;

pub use particle::{BiomarkerData, Particle, ParticleClass, ParticleId, Payload};
