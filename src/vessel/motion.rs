//! Directional translation rules shared by the per-tick move and the
//! cross-segment handoff.

use glam::DVec3;

use crate::geometry::VesselType;

/// The geometric facts of a segment that the translation rule needs.
#[derive(Debug, Clone, Copy)]
pub struct MotionContext {
    pub angle_deg: f64,
    pub vessel_type: VesselType,
    pub start: DVec3,
    pub stop: DVec3,
    pub length: f64,
}

impl MotionContext {
    /// Whether a centerline position lies past the end of the segment:
    /// either its planar distance from the start exceeds the length, or
    /// (for z-axis organ movement on straight segments) z left [-2, 2].
    pub fn exceeds(&self, position: DVec3) -> bool {
        let dx = position.x - self.start.x;
        let dy = position.y - self.start.y;
        let planar = (dx * dx + dy * dy).sqrt();
        planar > self.length
            || (position.z < -2.0 && self.angle_deg == 0.0)
            || (position.z > 2.0 && self.angle_deg == 0.0)
    }

    /// Like [`exceeds`](Self::exceeds) but with the unconditional z bound
    /// used when a particle has just been handed into this segment.
    pub fn exceeds_after_handoff(&self, position: DVec3) -> bool {
        let dx = position.x - self.start.x;
        let dy = position.y - self.start.y;
        let planar = (dx * dx + dy * dy).sqrt();
        planar > self.length || position.z < -2.0 || position.z > 2.0
    }
}

/// Moves a position by `distance` along a segment's direction.
///
/// Cardinal angles (0°, ±90°, ±180°) move along a single axis. A straight
/// organ segment instead moves along z, toward the tissue plane implied by
/// the entry z of ±2. All other angles move by the angle's cosine/sine.
/// `entry_z` is the start z of the segment for per-tick motion, or the old
/// segment's stop z during a handoff.
pub fn translate_position(
    mut position: DVec3,
    distance: f64,
    angle_deg: f64,
    vessel_type: VesselType,
    entry_z: f64,
) -> DVec3 {
    let organ = vessel_type == VesselType::Organ;
    if angle_deg == 0.0 && !organ {
        position.x += distance;
    } else if angle_deg == -180.0 || angle_deg == 180.0 {
        position.x -= distance;
    } else if angle_deg == -90.0 {
        position.y -= distance;
    } else if angle_deg == 90.0 {
        position.y += distance;
    } else if angle_deg == 0.0 && organ && entry_z == 2.0 {
        position.z -= distance;
    } else if angle_deg == 0.0 && organ && entry_z == -2.0 {
        position.z += distance;
    } else if (0.0 < angle_deg && angle_deg < 90.0)
        || (-90.0 < angle_deg && angle_deg < 0.0)
        || (90.0 < angle_deg && angle_deg < 180.0)
        || (-180.0 < angle_deg && angle_deg < -90.0)
    {
        let rad = (angle_deg % 360.0).to_radians();
        position.x += distance * rad.cos();
        position.y += distance * rad.sin();
    }
    position
}
