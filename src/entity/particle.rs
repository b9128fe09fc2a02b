//! The unified mobile-particle type.

use std::fmt;

use glam::DVec3;

use crate::scheduler::SimTime;

/// Which per-lane collection a mobility pass operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleClass {
    Nanobot,
    Biomarker,
}

/// Identifier of a particle, unique within its category.
///
/// Nanobots use dense integer IDs assigned at injection; biomarkers use the
/// `"{index}_{release_time:.1}"` scheme so IDs stay unique across bursts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParticleId {
    Bot(u32),
    Marker(String),
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleId::Bot(id) => write!(f, "{}", id),
            ParticleId::Marker(id) => write!(f, "{}", id),
        }
    }
}

/// Biomarker-specific payload: provenance and lifecycle.
#[derive(Debug, Clone)]
pub struct BiomarkerData {
    /// Particle diameter in µm.
    pub size_um: f64,
    /// Type tag encoding the source vessel, e.g. `"BM17"`.
    pub marker_type: String,
    /// Source vessel ID rendered as a 16-bit binary string.
    pub source_data: String,
    /// Release timestamp.
    pub created: SimTime,
    /// Seconds the marker stays active after release.
    pub active_duration: f64,
}

/// Category payload of a particle.
#[derive(Debug, Clone)]
pub enum Payload {
    Nanobot,
    Biomarker(BiomarkerData),
}

/// A mobile simulated particle: position, lane, and movement bookkeeping.
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    /// Owned exclusively by this particle; only the motion engine mutates it.
    pub position: DVec3,
    /// Lane index within the owning segment.
    pub lane: usize,
    /// Timestamp of the last position update. A segment moves a particle
    /// only if `last_move < now`, so one tick never moves it twice.
    pub last_move: SimTime,
    /// Transient lane-change flag, cleared when the change is applied.
    pub should_change_lane: bool,
    pub payload: Payload,
}

impl Particle {
    pub fn nanobot(id: u32, position: DVec3) -> Self {
        Self {
            id: ParticleId::Bot(id),
            position,
            lane: 0,
            last_move: SimTime::ZERO,
            should_change_lane: false,
            payload: Payload::Nanobot,
        }
    }

    pub fn biomarker(id: String, position: DVec3, data: BiomarkerData) -> Self {
        Self {
            id: ParticleId::Marker(id),
            position,
            lane: 0,
            last_move: SimTime::ZERO,
            should_change_lane: false,
            payload: Payload::Biomarker(data),
        }
    }

    pub fn class(&self) -> ParticleClass {
        match self.payload {
            Payload::Nanobot => ParticleClass::Nanobot,
            Payload::Biomarker(_) => ParticleClass::Biomarker,
        }
    }

    /// Whether the particle has outlived its active duration. Nanobots
    /// never expire; a biomarker expires once `now - created` reaches its
    /// active duration exactly.
    pub fn expired(&self, now: SimTime) -> bool {
        match &self.payload {
            Payload::Nanobot => false,
            Payload::Biomarker(data) => now - data.created >= data.active_duration,
        }
    }

    /// Type string used in trace output.
    pub fn kind_tag(&self) -> &str {
        match &self.payload {
            Payload::Nanobot => "NB",
            Payload::Biomarker(data) => &data.marker_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(created: f64, active: f64) -> Particle {
        Particle::biomarker(
            "0_0.0".to_string(),
            DVec3::ZERO,
            BiomarkerData {
                size_um: 10.0,
                marker_type: "BM1".to_string(),
                source_data: format!("{:016b}", 1),
                created: SimTime::from_secs(created),
                active_duration: active,
            },
        )
    }

    #[test]
    fn test_expiry_boundary() {
        let bm = marker(0.0, 60.0);
        assert!(!bm.expired(SimTime::from_secs(59.9)));
        assert!(bm.expired(SimTime::from_secs(60.0)));
        assert!(bm.expired(SimTime::from_secs(60.1)));
    }

    #[test]
    fn test_nanobots_never_expire() {
        let nb = Particle::nanobot(1, DVec3::ZERO);
        assert!(!nb.expired(SimTime::from_secs(1e9)));
    }

    #[test]
    fn test_id_ordering_within_category() {
        assert!(ParticleId::Bot(2) < ParticleId::Bot(10));
        assert!(
            ParticleId::Marker("1_0.0".into()) < ParticleId::Marker("2_0.0".into()),
            "marker IDs sort lexically"
        );
    }

    #[test]
    fn test_source_data_encoding() {
        let bm = marker(0.0, 60.0);
        match &bm.payload {
            Payload::Biomarker(data) => assert_eq!(data.source_data, "0000000000000001"),
            _ => unreachable!(),
        }
    }
}
