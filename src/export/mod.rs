//! CSV trace export for simulation runs.

mod sensors;
mod trace;

pub use sensors::SensorCounter;
pub use trace::TraceWriter;

use crate::entity::Particle;
use crate::scheduler::SimTime;

/// Sink for per-particle trace samples, written as entities are processed.
///
/// The motion engine reports through this seam so the core stays decoupled
/// from file I/O; tests plug in `()` to discard output.
pub trait TraceSink {
    /// Records a particle observed in `vessel` at time `now`.
    fn record(&mut self, particle: &Particle, vessel: u32, now: SimTime);
}

/// Discards every sample.
impl TraceSink for () {
    fn record(&mut self, _particle: &Particle, _vessel: u32, _now: SimTime) {}
}
