// facade_core/src/error.rs

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::capture::CaptureError;
use crate::geometry::GeometryError;
use crate::vehicle::{VehicleCommand, VehicleError};

/// Every way a scan can end early. All of them are fatal for the flight.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("connection failure during `{command}`: {source}")]
    ConnectionFailure {
        command: VehicleCommand,
        #[source]
        source: VehicleError,
    },

    #[error("invalid scan geometry: {0}")]
    InvalidScanGeometry(#[from] GeometryError),

    #[error("capture of snapshot {index} failed: {source}")]
    CaptureFailure {
        index: u64,
        #[source]
        source: CaptureError,
    },

    #[error("vehicle command `{command}` did not complete within {timeout:?}")]
    Timeout {
        command: VehicleCommand,
        timeout: Duration,
    },

    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// Classifies a failed vehicle command. Timeouts keep their own kind;
    /// everything else means the vehicle could not be driven.
    pub fn from_vehicle(command: VehicleCommand, error: VehicleError) -> Self {
        match error {
            VehicleError::Timeout { command, timeout } => ScanError::Timeout { command, timeout },
            source => ScanError::ConnectionFailure { command, source },
        }
    }

    pub fn kind(&self) -> AbortReason {
        match self {
            ScanError::ConnectionFailure { .. } => AbortReason::ConnectionFailure,
            ScanError::InvalidScanGeometry(_) => AbortReason::InvalidScanGeometry,
            ScanError::CaptureFailure { .. } => AbortReason::CaptureFailure,
            ScanError::Timeout { .. } => AbortReason::Timeout,
            ScanError::Cancelled => AbortReason::Cancelled,
        }
    }
}

/// Field-free mirror of [`ScanError`] for reports and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    ConnectionFailure,
    InvalidScanGeometry,
    CaptureFailure,
    Timeout,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbortReason::ConnectionFailure => "ConnectionFailure",
            AbortReason::InvalidScanGeometry => "InvalidScanGeometry",
            AbortReason::CaptureFailure => "CaptureFailure",
            AbortReason::Timeout => "Timeout",
            AbortReason::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_timeouts_keep_their_kind() {
        let err = ScanError::from_vehicle(
            VehicleCommand::MoveToPosition,
            VehicleError::Timeout {
                command: VehicleCommand::MoveToPosition,
                timeout: Duration::from_secs(5),
            },
        );
        assert_eq!(err.kind(), AbortReason::Timeout);
    }

    #[test]
    fn other_vehicle_errors_are_connection_failures() {
        let err = ScanError::from_vehicle(
            VehicleCommand::Arm,
            VehicleError::Rejected {
                command: VehicleCommand::Arm,
                reason: "no api control".into(),
            },
        );
        assert_eq!(err.kind(), AbortReason::ConnectionFailure);
        assert!(err.to_string().contains("`arm`"));
    }
}
