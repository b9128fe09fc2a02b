//! Static lane layout shared by every vessel segment.
//!
//! A segment carries 21 parallel lanes. Each lane has a velocity percentage
//! relative to the vessel's base velocity and a signed lateral offset in
//! "units"; units are scaled to actual coordinates by half the vessel width
//! divided by the largest unit in the table.

/// Velocity percentage and signed lateral offset units of one lane.
#[derive(Debug, Clone, Copy)]
pub struct LaneProfile {
    /// Percentage of the vessel base velocity (0-100).
    pub velocity_percent: u32,
    /// Lateral offset units along the first cross-flow axis.
    pub offset_x_units: i32,
    /// Lateral offset units along the second cross-flow axis.
    pub offset_y_units: i32,
}

const fn lane(velocity_percent: u32, offset_x_units: i32, offset_y_units: i32) -> LaneProfile {
    LaneProfile { velocity_percent, offset_x_units, offset_y_units }
}

/// Hand-authored layout: a fast center lane ringed by progressively slower
/// and further-offset lanes.
pub const LANE_PROFILE: [LaneProfile; 21] = [
    lane(100, 0, 0),
    lane(95, -1, 0),
    lane(95, 1, 0),
    lane(95, 0, -1),
    lane(95, 0, 1),
    lane(95, -1, -1),
    lane(95, 1, 1),
    lane(95, 1, -1),
    lane(95, -1, 1),
    lane(90, 2, 0),
    lane(90, -2, 0),
    lane(90, 0, 2),
    lane(90, 0, -2),
    lane(90, 2, -1),
    lane(90, -2, 1),
    lane(90, -1, 2),
    lane(90, 1, -2),
    lane(90, 2, 1),
    lane(90, -2, -1),
    lane(90, 1, 2),
    lane(90, -1, -2),
];

/// Largest positive offset unit in the profile, used to scale units into
/// coordinate offsets.
pub fn max_offset_units() -> i32 {
    LANE_PROFILE
        .iter()
        .flat_map(|p| [p.offset_x_units, p.offset_y_units])
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_shape() {
        assert_eq!(LANE_PROFILE.len(), 21);
        assert_eq!(LANE_PROFILE[0].velocity_percent, 100);
        assert!(LANE_PROFILE.iter().all(|p| p.velocity_percent <= 100));
    }

    #[test]
    fn test_max_offset_units() {
        assert_eq!(max_offset_units(), 2);
    }
}
