// facade_core/src/telemetry.rs

//! Trajectory logs in the simulator's recording format: a header row naming
//! the columns, then one whitespace-separated row per recorded state.
//! Readers find columns by header name, never by position.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::frames::{ned_to_scan, NedPoint};

pub const COLUMN_VEHICLE: &str = "VehicleName";
pub const COLUMN_TIMESTAMP: &str = "TimeStamp";
pub const COLUMN_POS_X: &str = "POS_X";
pub const COLUMN_POS_Y: &str = "POS_Y";
pub const COLUMN_POS_Z: &str = "POS_Z";

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("trajectory log has no header row")]
    MissingHeader,

    #[error("trajectory log has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

/// One recorded vehicle state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    pub vehicle_name: String,
    /// Milliseconds since the recording started.
    pub timestamp_ms: u64,
    pub position: NedPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryLog {
    pub samples: Vec<TrajectorySample>,
}

impl TrajectoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: TrajectorySample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Renders the log as tab-separated text with a header row.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{COLUMN_VEHICLE}\t{COLUMN_TIMESTAMP}\t{COLUMN_POS_X}\t{COLUMN_POS_Y}\t{COLUMN_POS_Z}"
        );
        for s in &self.samples {
            let _ = writeln!(
                out,
                "{}\t{}\t{:.6}\t{:.6}\t{:.6}",
                s.vehicle_name, s.timestamp_ms, s.position.x, s.position.y, s.position.z
            );
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<(), TelemetryError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, TelemetryError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parses any whitespace-delimited log carrying `POS_X`, `POS_Y` and
    /// `POS_Z`. `VehicleName` and `TimeStamp` are optional; other columns are
    /// ignored. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, TelemetryError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(TelemetryError::MissingHeader)?;
        let headers: Vec<&str> = header.split_whitespace().collect();
        let find = |name: &str| headers.iter().position(|h| *h == name);

        let idx_x = find(COLUMN_POS_X).ok_or(TelemetryError::MissingColumn(COLUMN_POS_X))?;
        let idx_y = find(COLUMN_POS_Y).ok_or(TelemetryError::MissingColumn(COLUMN_POS_Y))?;
        let idx_z = find(COLUMN_POS_Z).ok_or(TelemetryError::MissingColumn(COLUMN_POS_Z))?;
        let idx_vehicle = find(COLUMN_VEHICLE);
        let idx_time = find(COLUMN_TIMESTAMP);

        let mut log = TrajectoryLog::new();
        for (line_no, row) in lines {
            let line = line_no + 1;
            let parts: Vec<&str> = row.split_whitespace().collect();
            if parts.len() < headers.len() {
                return Err(TelemetryError::MalformedRow {
                    line,
                    reason: format!("expected {} fields, found {}", headers.len(), parts.len()),
                });
            }

            let coord = |idx: usize, name: &str| -> Result<f64, TelemetryError> {
                parts[idx]
                    .parse::<f64>()
                    .map_err(|e| TelemetryError::MalformedRow {
                        line,
                        reason: format!("{name}: {e}"),
                    })
            };

            let timestamp_ms = match idx_time {
                Some(i) => parts[i]
                    .parse::<u64>()
                    .map_err(|e| TelemetryError::MalformedRow {
                        line,
                        reason: format!("{COLUMN_TIMESTAMP}: {e}"),
                    })?,
                None => 0,
            };

            log.push(TrajectorySample {
                vehicle_name: idx_vehicle.map(|i| parts[i].to_string()).unwrap_or_default(),
                timestamp_ms,
                position: NedPoint::new(
                    coord(idx_x, COLUMN_POS_X)?,
                    coord(idx_y, COLUMN_POS_Y)?,
                    coord(idx_z, COLUMN_POS_Z)?,
                ),
            });
        }
        Ok(log)
    }

    pub fn summary(&self) -> Option<TrajectorySummary> {
        TrajectorySummary::from_log(self)
    }
}

// =========================================================================
// == Summary ==
// =========================================================================

/// Extents of a recorded flight, altitudes up-positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    pub samples: usize,
    pub min_y: f64,
    pub max_y: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub path_length: f64,
    pub duration_ms: u64,
}

impl TrajectorySummary {
    pub fn from_log(log: &TrajectoryLog) -> Option<Self> {
        let first = log.samples.first()?;
        let start = ned_to_scan(&first.position);

        let mut summary = Self {
            samples: log.len(),
            min_y: start.y,
            max_y: start.y,
            min_altitude: start.z,
            max_altitude: start.z,
            path_length: 0.0,
            duration_ms: 0,
        };

        for pair in log.samples.windows(2) {
            summary.path_length += pair[0].position.distance_to(&pair[1].position);
        }
        for sample in &log.samples {
            let p = ned_to_scan(&sample.position);
            summary.min_y = summary.min_y.min(p.y);
            summary.max_y = summary.max_y.max(p.y);
            summary.min_altitude = summary.min_altitude.min(p.z);
            summary.max_altitude = summary.max_altitude.max(p.z);
        }
        if let Some(last) = log.samples.last() {
            summary.duration_ms = last.timestamp_ms.saturating_sub(first.timestamp_ms);
        }
        Some(summary)
    }
}
