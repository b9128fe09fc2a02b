//! Vasculature map records and CSV loading.

use std::path::Path;

use anyhow::{Context, Result};
use glam::DVec3;

/// Class of a vessel segment, fixing its base flow velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselType {
    Artery,
    Vein,
    Organ,
}

impl VesselType {
    /// Base flow velocity for the vessel class, in simulation units.
    pub fn base_velocity(&self) -> f64 {
        match self {
            VesselType::Artery => 10.0,
            VesselType::Vein => 3.7,
            VesselType::Organ => 1.0,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(VesselType::Artery),
            1 => Some(VesselType::Vein),
            2 => Some(VesselType::Organ),
            _ => None,
        }
    }
}

/// One row of the vasculature map: a directed vessel segment.
#[derive(Debug, Clone)]
pub struct VesselRecord {
    pub id: u32,
    pub vessel_type: VesselType,
    pub start: DVec3,
    pub stop: DVec3,
}

/// Loads vessel records from a comma-delimited map file.
///
/// Each row carries 8 integer fields:
/// `id, type(0=artery,1=vein,2=organ), startX, startY, startZ, stopX, stopY, stopZ`.
/// A short or malformed row is logged and skipped; the rest of the file
/// still loads. A missing file is an error, since no circuit can be built
/// without a map.
pub fn load_vessel_records<P: AsRef<Path>>(path: P) -> Result<Vec<VesselRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open vasculature map {}", path.display()))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("skipping unreadable map row {}: {}", row + 1, e);
                continue;
            }
        };
        match parse_row(&raw) {
            Some(record) => records.push(record),
            None => log::warn!("skipping malformed map row {}: {:?}", row + 1, raw),
        }
    }
    log::info!("loaded {} vessel records from {}", records.len(), path.display());
    Ok(records)
}

fn parse_row(raw: &csv::StringRecord) -> Option<VesselRecord> {
    if raw.len() < 8 {
        return None;
    }
    let mut fields = [0i64; 8];
    for (slot, field) in fields.iter_mut().zip(raw.iter()) {
        *slot = field.parse().ok()?;
    }
    Some(VesselRecord {
        id: u32::try_from(fields[0]).ok()?,
        vessel_type: VesselType::from_code(fields[1])?,
        start: DVec3::new(fields[2] as f64, fields[3] as f64, fields[4] as f64),
        stop: DVec3::new(fields[5] as f64, fields[6] as f64, fields[7] as f64),
    })
}
