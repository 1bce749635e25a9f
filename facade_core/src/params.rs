// facade_core/src/params.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::geometry::GeometryError;
use crate::policy::TerminationPolicyKind;
use crate::vehicle::{ImageRequest, ImageType};

// =========================================================================
// == Scan Parameters ==
// =========================================================================

/// # ScanParameters
/// The immutable description of the facade and the camera, fixed at flight
/// start. Lengths are in meters, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScanParameters {
    /// Horizontal extent of the facade covered by every pass.
    pub building_width: f64,
    /// Altitude of the first pass, above the takeoff point.
    pub initial_altitude: f64,
    /// Nominal height of the facade. Carried through to reports only; the
    /// vertical extent of a scan is decided by the termination policy.
    pub building_height: f64,
    pub camera_horizontal_fov_deg: f64,
    /// Image width divided by image height.
    pub image_aspect_ratio: f64,
    /// Fraction of the vertical footprint re-covered between passes. Also the
    /// factor the altitude band shrinks by after every pass.
    pub lateral_overlap: f64,
    /// Fraction of the horizontal footprint re-covered between two shots.
    pub longitudinal_overlap: f64,
}

impl Default for ScanParameters {
    fn default() -> Self {
        ScanPreset::Dense.parameters()
    }
}

impl ScanParameters {
    /// Checks every field that the planner divides by, takes the tangent of,
    /// or multiplies the altitude band with.
    pub fn validate(&self) -> Result<(), GeometryError> {
        positive("building width", self.building_width)?;
        positive("initial altitude", self.initial_altitude)?;
        if !(self.camera_horizontal_fov_deg > 0.0 && self.camera_horizontal_fov_deg < 180.0) {
            return Err(GeometryError::DegenerateFieldOfView(
                self.camera_horizontal_fov_deg,
            ));
        }
        if !(self.image_aspect_ratio > 0.0) || !self.image_aspect_ratio.is_finite() {
            return Err(GeometryError::NonPositiveAspectRatio(self.image_aspect_ratio));
        }
        open_unit("lateral", self.lateral_overlap)?;
        open_unit("longitudinal", self.longitudinal_overlap)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveExtent { name, value })
    }
}

fn open_unit(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(GeometryError::OverlapOutOfRange { name, value })
    }
}

// =========================================================================
// == Presets ==
// =========================================================================

/// The two parameter sets the scanner has historically been flown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ScanPreset {
    /// 80 % lateral / 90 % longitudinal overlap from 11 m, stopping once the
    /// band drops below a quarter of the vertical footprint.
    Dense,
    /// 60 % lateral / 80 % longitudinal overlap from 13 m, with one closing
    /// pass once the band reaches half the vertical footprint.
    Relaxed,
}

impl ScanPreset {
    pub fn parameters(self) -> ScanParameters {
        let (initial_altitude, lateral_overlap, longitudinal_overlap) = match self {
            ScanPreset::Dense => (11.0, 0.8, 0.9),
            ScanPreset::Relaxed => (13.0, 0.6, 0.8),
        };
        ScanParameters {
            building_width: 26.0,
            initial_altitude,
            building_height: 12.0,
            camera_horizontal_fov_deg: 90.0,
            image_aspect_ratio: 2560.0 / 1280.0,
            lateral_overlap,
            longitudinal_overlap,
        }
    }

    pub fn termination(self) -> TerminationPolicyKind {
        match self {
            ScanPreset::Dense => TerminationPolicyKind::CoverageFloor {
                fraction: TerminationPolicyKind::DEFAULT_FLOOR_FRACTION,
            },
            ScanPreset::Relaxed => TerminationPolicyKind::CoverageCeiling {
                fraction: TerminationPolicyKind::DEFAULT_CEILING_FRACTION,
            },
        }
    }
}

// =========================================================================
// == Flight Settings ==
// =========================================================================

/// How the executor talks to the vehicle: speeds, waits, timeouts and the
/// names of the sensors it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FlightSettings {
    /// Cruise speed for every move-to-position command, m/s.
    pub speed: f64,
    /// Wait after the hold command before a frame is requested, seconds.
    pub settle_delay_secs: f64,
    /// Upper bound on any single blocking vehicle command, seconds.
    pub command_timeout_secs: f64,
    pub vehicle_name: String,
    /// Forward-facing range sensor that measures the stand-off.
    pub distance_sensor: String,
    pub camera_name: String,
    pub image_type: ImageType,
    /// Readings above this are treated as a missed wall.
    pub max_standoff: f64,
    /// Ground clearance: no pass is flown below this band.
    pub min_altitude: f64,
    pub max_passes: u32,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            speed: 2.0,
            settle_delay_secs: 2.0,
            command_timeout_secs: 60.0,
            vehicle_name: "MyDrone".to_string(),
            distance_sensor: "Distance".to_string(),
            camera_name: "0".to_string(),
            image_type: ImageType::Scene,
            max_standoff: 40.0,
            min_altitude: 1.0,
            max_passes: 32,
        }
    }
}

impl FlightSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.settle_delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.command_timeout_secs).unwrap_or(Duration::MAX)
    }

    pub fn image_request(&self) -> ImageRequest {
        ImageRequest {
            camera_name: self.camera_name.clone(),
            image_type: self.image_type,
        }
    }
}
