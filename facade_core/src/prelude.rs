// facade_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::capture::ImageSink;
pub use crate::policy::{PassDecision, TerminationPolicy};
pub use crate::vehicle::VehicleClient;

// --- Parameters and derived geometry ---
pub use crate::geometry::DerivedGeometry;
pub use crate::params::{FlightSettings, ScanParameters, ScanPreset};
pub use crate::policy::TerminationPolicyKind;

// --- Running a scan ---
pub use crate::cancel::CancellationToken;
pub use crate::capture::FileImageSink;
pub use crate::error::{AbortReason, ScanError};
pub use crate::executor::{PassRecord, ScanExecutor, ScanOutcome, ScanPhase, ScanReport};

// --- Coordinates and telemetry ---
pub use crate::frames::{ned_to_scan, scan_to_ned, NedPoint, ScanPoint};
pub use crate::telemetry::{TrajectoryLog, TrajectorySample, TrajectorySummary};
pub use crate::vehicle::{ImageRequest, ImageType, VehicleCommand, VehicleError};
