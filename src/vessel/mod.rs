//! Vessel segments and the per-tick motion engine.
//!
//! A segment is one directed edge of the circulatory graph. It owns 21
//! parallel lanes of particles and, once per tick, runs the three motion
//! phases in order: lane change (organs only, every other tick), translate,
//! and handoff collection. Handoffs to successor segments are resolved at
//! the circuit level, since they touch more than one segment.

mod lane;
mod motion;
mod segment;

pub use lane::Lane;
pub use motion::{translate_position, MotionContext};
pub use segment::{Segment, StepOutput};
