//! Discrete-event scheduling for the circuit simulation.
//!
//! Every vessel segment reschedules its own next tick one Δt in the future,
//! so "concurrency" here is purely cooperative: events interleave in global
//! time order, and events sharing a timestamp run in insertion order.

mod queue;
mod time;

pub use queue::{Event, EventQueue};
pub use time::SimTime;
