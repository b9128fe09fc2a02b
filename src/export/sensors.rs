//! Per-second biomarker counts at designated sensor vessels.

use std::collections::HashSet;

use crate::scheduler::SimTime;

/// Counts distinct biomarker IDs seen at a fixed set of sensor vessels,
/// flushing one aggregate sample per simulated second and resetting.
#[derive(Debug)]
pub struct SensorCounter {
    sensors: Vec<(u32, HashSet<String>)>,
    last_flush: SimTime,
}

impl SensorCounter {
    pub fn new(sensor_vessels: &[u32]) -> Self {
        Self {
            sensors: sensor_vessels.iter().map(|&id| (id, HashSet::new())).collect(),
            last_flush: SimTime::ZERO,
        }
    }

    /// Notes a biomarker sighting. Returns true if the vessel is a sensor.
    pub fn observe(&mut self, vessel: u32, marker_id: &str) -> bool {
        match self.sensors.iter_mut().find(|(id, _)| *id == vessel) {
            Some((_, seen)) => {
                seen.insert(marker_id.to_string());
                true
            }
            None => false,
        }
    }

    /// If a simulated second has elapsed since the last flush, returns the
    /// per-sensor distinct counts (in sensor declaration order) and resets
    /// them.
    pub fn flush_due(&mut self, now: SimTime) -> Option<Vec<(u32, usize)>> {
        if now - self.last_flush < 1.0 {
            return None;
        }
        self.last_flush = now;
        Some(
            self.sensors
                .iter_mut()
                .map(|(id, seen)| {
                    let count = seen.len();
                    seen.clear();
                    (*id, count)
                })
                .collect(),
        )
    }

    pub fn sensor_ids(&self) -> Vec<u32> {
        self.sensors.iter().map(|(id, _)| *id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_counting_and_reset() {
        let mut counter = SensorCounter::new(&[94, 75]);
        assert!(counter.observe(94, "0_1.0"));
        assert!(counter.observe(94, "0_1.0"));
        assert!(counter.observe(94, "1_1.0"));
        assert!(!counter.observe(50, "2_1.0"), "non-sensor vessel ignored");

        assert!(counter.flush_due(SimTime::from_secs(0.5)).is_none());
        let counts = counter.flush_due(SimTime::from_secs(1.0)).unwrap();
        assert_eq!(counts, vec![(94, 2), (75, 0)]);

        // counters reset after the flush
        let counts = counter.flush_due(SimTime::from_secs(2.0)).unwrap();
        assert_eq!(counts, vec![(94, 0), (75, 0)]);
    }
}
