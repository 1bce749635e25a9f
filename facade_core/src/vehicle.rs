// facade_core/src/vehicle.rs

//! The contract the executor drives. A real autopilot client or the
//! simulator in `facade_sim` implements it; the tests use a recording mock.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::Duration;
use thiserror::Error;

use crate::frames::NedPoint;

/// Every command the executor can issue. Used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleCommand {
    ConfirmConnection,
    EnableApiControl,
    DisableApiControl,
    Arm,
    Disarm,
    Takeoff,
    MoveToPosition,
    Hover,
    Land,
    ReadPosition,
    ReadDistance,
    CaptureImage,
}

impl fmt::Display for VehicleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleCommand::ConfirmConnection => "confirm_connection",
            VehicleCommand::EnableApiControl => "enable_api_control",
            VehicleCommand::DisableApiControl => "disable_api_control",
            VehicleCommand::Arm => "arm",
            VehicleCommand::Disarm => "disarm",
            VehicleCommand::Takeoff => "takeoff",
            VehicleCommand::MoveToPosition => "move_to_position",
            VehicleCommand::Hover => "hover",
            VehicleCommand::Land => "land",
            VehicleCommand::ReadPosition => "read_position",
            VehicleCommand::ReadDistance => "read_distance",
            VehicleCommand::CaptureImage => "capture_image",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VehicleError {
    #[error("vehicle link is down: {0}")]
    Disconnected(String),

    #[error("vehicle rejected `{command}`: {reason}")]
    Rejected {
        command: VehicleCommand,
        reason: String,
    },

    #[error("`{command}` did not complete within {timeout:?}")]
    Timeout {
        command: VehicleCommand,
        timeout: Duration,
    },

    #[error("sensor or camera `{0}` is unavailable")]
    Unavailable(String),
}

/// Which rendering of the scene a camera should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ImageType {
    #[default]
    Scene,
    DepthPlanar,
    Segmentation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub camera_name: String,
    pub image_type: ImageType,
}

// --- VEHICLE CLIENT TRAIT ---
/// A synchronous command sink plus telemetry for one multirotor.
///
/// Every motion command blocks until the vehicle reports completion or
/// `timeout` elapses, in which case it returns [`VehicleError::Timeout`].
/// Positions are exchanged in the vehicle's NED frame.
pub trait VehicleClient: Debug + Send {
    fn confirm_connection(&mut self) -> Result<(), VehicleError>;

    fn enable_api_control(&mut self, enabled: bool) -> Result<(), VehicleError>;

    fn arm_disarm(&mut self, arm: bool) -> Result<(), VehicleError>;

    fn takeoff(&mut self, timeout: Duration) -> Result<(), VehicleError>;

    fn move_to_position(
        &mut self,
        target: NedPoint,
        speed: f64,
        timeout: Duration,
    ) -> Result<(), VehicleError>;

    /// Holds the current position.
    fn hover(&mut self, timeout: Duration) -> Result<(), VehicleError>;

    fn land(&mut self, timeout: Duration) -> Result<(), VehicleError>;

    /// Estimated position from the vehicle's kinematics.
    fn position(&mut self) -> Result<NedPoint, VehicleError>;

    /// Reads a named range sensor, in meters.
    fn distance(&mut self, sensor_name: &str) -> Result<f64, VehicleError>;

    /// Requests one encoded frame from a camera.
    fn capture_image(&mut self, request: &ImageRequest) -> Result<Vec<u8>, VehicleError>;

    /// Blocks for `delay` while the airframe damps residual motion.
    /// Simulators may advance their own clock instead of sleeping.
    fn settle(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
