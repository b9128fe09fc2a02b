//! One lane ("stream") of a vessel segment.

use glam::DVec3;

use crate::entity::{Particle, ParticleClass};
use crate::geometry::LaneProfile;

/// A lane holds the particles travelling on one offset path of a segment,
/// split by category so the nanobot and biomarker passes stay independent.
/// Insertion order is the iteration order for a tick.
#[derive(Debug)]
pub struct Lane {
    index: usize,
    velocity: f64,
    offset: DVec3,
    nanobots: Vec<Particle>,
    biomarkers: Vec<Particle>,
}

impl Lane {
    /// Builds a lane from its profile entry.
    ///
    /// The velocity is the segment base velocity scaled by the lane's
    /// percentage. The lateral offset rotates the profile units into the
    /// segment's cross-flow plane: for an angled segment the x units are
    /// rotated by (angle - 90°) and the y units map to z; for a straight
    /// (angle 0) segment the two unit axes swap onto y and z directly.
    pub fn new(index: usize, profile: &LaneProfile, base_velocity: f64, angle_deg: f64, unit_scale: f64) -> Self {
        let off_x = profile.offset_x_units as f64 * unit_scale;
        let off_y = profile.offset_y_units as f64 * unit_scale;
        let offset = if angle_deg != 0.0 {
            let rot = ((angle_deg - 90.0) % 360.0).to_radians();
            DVec3::new(off_x * rot.cos(), off_x * rot.sin(), off_y)
        } else {
            DVec3::new(off_y, off_x, 0.0)
        };
        Self {
            index,
            velocity: base_velocity * profile.velocity_percent as f64 / 100.0,
            offset,
            nanobots: Vec::new(),
            biomarkers: Vec::new(),
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    fn slot(&self, class: ParticleClass) -> &Vec<Particle> {
        match class {
            ParticleClass::Nanobot => &self.nanobots,
            ParticleClass::Biomarker => &self.biomarkers,
        }
    }

    fn slot_mut(&mut self, class: ParticleClass) -> &mut Vec<Particle> {
        match class {
            ParticleClass::Nanobot => &mut self.nanobots,
            ParticleClass::Biomarker => &mut self.biomarkers,
        }
    }

    pub fn count(&self, class: ParticleClass) -> usize {
        self.slot(class).len()
    }

    pub fn is_empty(&self, class: ParticleClass) -> bool {
        self.slot(class).is_empty()
    }

    pub fn get(&self, class: ParticleClass, idx: usize) -> &Particle {
        &self.slot(class)[idx]
    }

    pub fn get_mut(&mut self, class: ParticleClass, idx: usize) -> &mut Particle {
        &mut self.slot_mut(class)[idx]
    }

    /// Adds a particle to the lane, stamping its lane index and shifting its
    /// position by the lane's lateral offset. Returns a reference to the
    /// stored particle.
    pub fn push(&mut self, mut particle: Particle) -> &Particle {
        particle.lane = self.index;
        particle.position += self.offset;
        let slot = self.slot_mut(particle.class());
        slot.push(particle);
        slot.last().expect("just pushed")
    }

    /// Removes the particle at `idx`, stripping the lane offset so the
    /// position is back on the segment centerline.
    pub fn remove_at(&mut self, class: ParticleClass, idx: usize) -> Particle {
        let mut particle = self.slot_mut(class).remove(idx);
        particle.position -= self.offset;
        particle
    }

    /// Re-sorts the lane by particle ID ascending, restoring a stable
    /// iteration order after lane changes.
    pub fn sort_by_id(&mut self, class: ParticleClass) {
        self.slot_mut(class).sort_by(|a, b| a.id.cmp(&b.id));
    }

    pub fn iter(&self, class: ParticleClass) -> impl Iterator<Item = &Particle> {
        self.slot(class).iter()
    }

    pub fn iter_mut(&mut self, class: ParticleClass) -> impl Iterator<Item = &mut Particle> {
        self.slot_mut(class).iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LANE_PROFILE;

    fn lane(index: usize, angle: f64) -> Lane {
        Lane::new(index, &LANE_PROFILE[index], 10.0, angle, 0.125)
    }

    #[test]
    fn test_velocity_scaling() {
        assert_eq!(lane(0, 0.0).velocity(), 10.0);
        assert_eq!(lane(1, 0.0).velocity(), 9.5);
        assert_eq!(lane(9, 0.0).velocity(), 9.0);
    }

    #[test]
    fn test_zero_angle_offsets_swap_axes() {
        // lane 1 has units (-1, 0): with angle 0 the x units land on y
        let l = lane(1, 0.0);
        assert_eq!(l.offset(), DVec3::new(0.0, -0.125, 0.0));
    }

    #[test]
    fn test_angled_offsets_rotate() {
        // at 90 degrees the rotation term is (angle - 90) = 0, so x units
        // stay on x and y units land on z
        let l = Lane::new(3, &LANE_PROFILE[3], 10.0, 90.0, 0.125);
        assert!((l.offset().x - 0.0).abs() < 1e-12);
        assert!((l.offset().z - -0.125).abs() < 1e-12);
    }

    #[test]
    fn test_push_and_remove_round_trip_offset() {
        let mut l = lane(1, 0.0);
        let p = Particle::nanobot(1, DVec3::new(5.0, 0.0, 0.0));
        let stored = l.push(p);
        assert_eq!(stored.lane, 1);
        assert_eq!(stored.position, DVec3::new(5.0, -0.125, 0.0));
        let back = l.remove_at(ParticleClass::Nanobot, 0);
        assert_eq!(back.position, DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_sort_by_id() {
        let mut l = lane(0, 0.0);
        l.push(Particle::nanobot(5, DVec3::ZERO));
        l.push(Particle::nanobot(2, DVec3::ZERO));
        l.push(Particle::nanobot(9, DVec3::ZERO));
        l.sort_by_id(ParticleClass::Nanobot);
        let ids: Vec<_> = l.iter(ParticleClass::Nanobot).map(|p| p.id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                crate::entity::ParticleId::Bot(2),
                crate::entity::ParticleId::Bot(5),
                crate::entity::ParticleId::Bot(9)
            ]
        );
    }
}
