//! Vessel geometry: types, map records, and the lane layout profile.

mod lanes;
mod records;

pub use lanes::{max_offset_units, LaneProfile, LANE_PROFILE};
pub use records::{load_vessel_records, VesselRecord, VesselType};
