//! Streaming CSV writers for particle traces and sensor aggregates.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use super::{SensorCounter, TraceSink};
use crate::entity::{Particle, ParticleId};
use crate::scheduler::SimTime;

/// Writes one row per particle per tick to a mobility trace file and, once
/// per simulated second, one aggregate row of distinct biomarker counts at
/// the sensor vessels.
///
/// Files are created under the given directory with a timestamped name.
pub struct TraceWriter {
    mobility: csv::Writer<File>,
    aggregate: csv::Writer<File>,
    sensors: SensorCounter,
    mobility_path: PathBuf,
}

impl TraceWriter {
    pub fn new<P: AsRef<Path>>(dir: P, sensor_vessels: &[u32]) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let mobility_path = dir.join(format!("mobility_{}.csv", timestamp));
        let aggregate_path = dir.join(format!("sensor_counts_{}.csv", timestamp));

        let mobility = csv::Writer::from_writer(File::create(&mobility_path)?);
        let mut aggregate = csv::Writer::from_writer(File::create(&aggregate_path)?);
        // header names the sensor columns so the rows are self-describing
        let mut header = vec!["time".to_string()];
        header.extend(sensor_vessels.iter().map(|id| format!("vessel_{}", id)));
        aggregate.write_record(&header)?;
        aggregate.flush()?;
        log::info!("trace export started: {}", mobility_path.display());

        Ok(Self {
            mobility,
            aggregate,
            sensors: SensorCounter::new(sensor_vessels),
            mobility_path,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.mobility_path
    }

    /// Flushes both writers and returns the mobility trace path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.mobility.flush()?;
        self.aggregate.flush()?;
        log::info!("trace export completed: {}", self.mobility_path.display());
        Ok(self.mobility_path)
    }

    fn write_row(&mut self, particle: &Particle, vessel: u32, now: SimTime) -> Result<()> {
        self.mobility.write_record(&[
            particle.id.to_string(),
            format!("{}", particle.position.x),
            format!("{}", particle.position.y),
            format!("{}", particle.position.z),
            format!("{}", now.as_secs()),
            vessel.to_string(),
            particle.lane.to_string(),
            particle.kind_tag().to_string(),
        ])?;

        if let ParticleId::Marker(id) = &particle.id {
            self.sensors.observe(vessel, id);
        }
        if let Some(counts) = self.sensors.flush_due(now) {
            let mut row = vec![format!("{}", now.as_secs())];
            row.extend(counts.iter().map(|(_, count)| count.to_string()));
            self.aggregate.write_record(&row)?;
            self.aggregate.flush()?;
        }
        Ok(())
    }
}

impl TraceSink for TraceWriter {
    fn record(&mut self, particle: &Particle, vessel: u32, now: SimTime) {
        if let Err(e) = self.write_row(particle, vessel, now) {
            log::error!("trace write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BiomarkerData;
    use glam::DVec3;

    #[test]
    fn test_rows_are_written() {
        let dir = std::env::temp_dir().join(format!("hemoflow_trace_{}", std::process::id()));
        let mut writer = TraceWriter::new(&dir, &[94]).unwrap();
        let bot = Particle::nanobot(7, DVec3::new(1.0, 2.0, 0.0));
        writer.record(&bot, 3, SimTime::from_secs(0.0));
        let path = writer.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("7,1,2,0,0,3,0,NB"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_aggregate_rows_name_their_sensor_columns() {
        let dir = std::env::temp_dir().join(format!("hemoflow_agg_{}", std::process::id()));
        let mut writer = TraceWriter::new(&dir, &[94, 75]).unwrap();

        let marker = Particle::biomarker(
            "4_0.0".to_string(),
            DVec3::ZERO,
            BiomarkerData {
                size_um: 10.0,
                marker_type: "BM1".to_string(),
                source_data: format!("{:016b}", 1u32),
                created: SimTime::ZERO,
                active_duration: 60.0,
            },
        );
        writer.record(&marker, 94, SimTime::from_secs(1.0));
        writer.finish().unwrap();

        let aggregate_path = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("sensor_counts_"))
            })
            .expect("aggregate file exists");
        let contents = std::fs::read_to_string(aggregate_path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("time,vessel_94,vessel_75"));
        assert_eq!(lines.next(), Some("1,1,0"), "one distinct marker at sensor 94");
        std::fs::remove_dir_all(dir).ok();
    }
}
