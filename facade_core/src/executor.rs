// facade_core/src/executor.rs

//! The scan state machine: `Init -> Ascend -> Measure -> Sweep -> Descend`,
//! with every abort routed through one cleanup path that leaves the vehicle
//! disarmed and released.

use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::capture::{CaptureError, ImageSink};
use crate::cursor::{FlightCursor, SweepDirection};
use crate::error::{AbortReason, ScanError};
use crate::frames::{ned_to_scan, scan_to_ned, NedPoint, ScanPoint};
use crate::geometry::DerivedGeometry;
use crate::params::{FlightSettings, ScanParameters};
use crate::policy::{PassDecision, TerminationPolicy};
use crate::vehicle::{VehicleClient, VehicleCommand, VehicleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Init,
    Ascend,
    Measure,
    Sweep,
    Descend,
    Finished,
}

#[derive(Debug)]
pub enum ScanOutcome {
    Completed,
    Aborted(ScanError),
}

/// One flown pass as it actually happened.
#[derive(Debug, Clone, PartialEq)]
pub struct PassRecord {
    pub index: u32,
    pub direction: SweepDirection,
    pub altitude_band: f64,
    pub captures: u32,
    /// Measured position after the last move of the pass, up-positive.
    pub end_position: ScanPoint,
}

/// Everything a finished run produced, whether or not it completed.
#[derive(Debug)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub policy: &'static str,
    /// Carried through from the parameters; it does not affect the flight.
    pub building_height: f64,
    pub geometry: Option<DerivedGeometry>,
    pub passes: Vec<PassRecord>,
    pub images: Vec<PathBuf>,
}

impl ScanReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Completed)
    }

    pub fn abort_reason(&self) -> Option<AbortReason> {
        match &self.outcome {
            ScanOutcome::Completed => None,
            ScanOutcome::Aborted(e) => Some(e.kind()),
        }
    }

    pub fn error(&self) -> Option<&ScanError> {
        match &self.outcome {
            ScanOutcome::Completed => None,
            ScanOutcome::Aborted(e) => Some(e),
        }
    }
}

/// What the run has done to the vehicle so far. Cleanup undoes exactly this.
#[derive(Debug, Default, Clone, Copy)]
struct VehicleState {
    api_control: bool,
    armed: bool,
    airborne: bool,
    at_origin: bool,
}

/// Products of the flight gathered while it runs.
#[derive(Debug, Default)]
struct FlightLog {
    geometry: Option<DerivedGeometry>,
    passes: Vec<PassRecord>,
    images: Vec<PathBuf>,
}

// =========================================================================
// == Executor ==
// =========================================================================

/// Drives one vehicle through one facade scan. Owns the vehicle and the sink
/// for the duration of the flight; get them back with [`into_parts`].
///
/// [`into_parts`]: ScanExecutor::into_parts
#[derive(Debug)]
pub struct ScanExecutor<V: VehicleClient, S: ImageSink> {
    vehicle: V,
    sink: S,
    params: ScanParameters,
    flight: FlightSettings,
    policy: Box<dyn TerminationPolicy>,
    cancel: CancellationToken,
    phase: ScanPhase,
}

impl<V, S> ScanExecutor<V, S>
where
    V: VehicleClient,
    S: ImageSink,
{
    pub fn new(
        vehicle: V,
        sink: S,
        params: ScanParameters,
        flight: FlightSettings,
        policy: Box<dyn TerminationPolicy>,
    ) -> Self {
        Self {
            vehicle,
            sink,
            params,
            flight,
            policy,
            cancel: CancellationToken::new(),
            phase: ScanPhase::Init,
        }
    }

    /// Shares `token` with the executor; cancelling it stops the sweep at the
    /// next step and flies the vehicle home.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (V, S) {
        (self.vehicle, self.sink)
    }

    /// Flies the whole scan. Never returns early: on any error the vehicle is
    /// brought down, disarmed and released before the report is built.
    pub fn run(&mut self) -> ScanReport {
        let mut state = VehicleState::default();
        let mut log = FlightLog::default();

        let result = self.fly(&mut state, &mut log);
        if let Err(e) = &result {
            error!("Scan aborted in {:?}: {}", self.phase, e);
        }
        self.secure_vehicle(&mut state, result.as_ref().err());
        self.phase = ScanPhase::Finished;

        let outcome = match result {
            Ok(()) => {
                info!(
                    "Scan completed: {} passes, {} images",
                    log.passes.len(),
                    log.images.len()
                );
                ScanOutcome::Completed
            }
            Err(e) => ScanOutcome::Aborted(e),
        };

        ScanReport {
            outcome,
            policy: self.policy.name(),
            building_height: self.params.building_height,
            geometry: log.geometry,
            passes: log.passes,
            images: log.images,
        }
    }

    fn fly(&mut self, state: &mut VehicleState, log: &mut FlightLog) -> Result<(), ScanError> {
        self.params.validate()?;

        // --- Init ---
        self.phase = ScanPhase::Init;
        info!("Connecting to vehicle '{}'", self.flight.vehicle_name);
        self.init_command(VehicleCommand::ConfirmConnection, |v| v.confirm_connection())?;
        self.init_command(VehicleCommand::EnableApiControl, |v| {
            v.enable_api_control(true)
        })?;
        state.api_control = true;
        info!("Arming the drone...");
        self.init_command(VehicleCommand::Arm, |v| v.arm_disarm(true))?;
        state.armed = true;

        // --- Ascend ---
        self.phase = ScanPhase::Ascend;
        let timeout = self.flight.command_timeout();
        info!("Taking off...");
        // A takeoff that times out may still have left the ground.
        state.airborne = true;
        self.command(VehicleCommand::Takeoff, |v| v.takeoff(timeout))?;
        let ground = self.read_position()?;
        let start = ScanPoint::new(ground.x, ground.y, self.params.initial_altitude);
        info!(
            "Climbing to position: {:.2},{:.2},{:.2}",
            start.x, start.y, start.z
        );
        self.move_to(&start)?;

        // --- Measure ---
        self.phase = ScanPhase::Measure;
        let sensor = self.flight.distance_sensor.clone();
        let standoff = self.command(VehicleCommand::ReadDistance, |v| v.distance(&sensor))?;
        info!("Initial distance: {standoff:.3}");
        let geometry =
            DerivedGeometry::from_standoff(&self.params, standoff, self.flight.max_standoff)?;
        info!(
            "Interval distance: {:.3}, vertical coverage: {:.3}",
            geometry.horizontal_capture_interval, geometry.vertical_coverage
        );
        log.geometry = Some(geometry);

        // --- Sweep ---
        self.phase = ScanPhase::Sweep;
        let mut cursor = FlightCursor::new(start, self.params.initial_altitude);
        let mut closing = false;
        loop {
            self.check_cancelled()?;
            if cursor.altitude_band() < self.flight.min_altitude {
                warn!(
                    "Altitude band {:.3} is below the minimum of {:.3}; ending sweep",
                    cursor.altitude_band(),
                    self.flight.min_altitude
                );
                break;
            }
            if cursor.passes_completed() >= self.flight.max_passes {
                warn!(
                    "Reached the limit of {} passes; ending sweep",
                    self.flight.max_passes
                );
                break;
            }

            let record = self.fly_pass(&mut cursor, &geometry, log)?;
            log.passes.push(record);
            if closing {
                break;
            }

            match self
                .policy
                .decide(cursor.altitude_band(), geometry.vertical_coverage)
            {
                PassDecision::Continue => {}
                PassDecision::FinalPass => {
                    debug!("{}: flying one closing pass", self.policy.name());
                    closing = true;
                }
                PassDecision::Terminate => {
                    debug!(
                        "{}: band {:.3} exhausts coverage",
                        self.policy.name(),
                        cursor.altitude_band()
                    );
                    break;
                }
            }
        }

        // --- Descend ---
        self.phase = ScanPhase::Descend;
        info!("Returning to origin");
        self.move_to(&ned_to_scan(&NedPoint::ORIGIN))?;
        state.at_origin = true;
        Ok(())
    }

    fn fly_pass(
        &mut self,
        cursor: &mut FlightCursor,
        geometry: &DerivedGeometry,
        log: &mut FlightLog,
    ) -> Result<PassRecord, ScanError> {
        let index = cursor.passes_completed();
        let direction = cursor.direction();
        let altitude_band = cursor.altitude_band();
        info!("Pass {index}: {direction:?} at {altitude_band:.3} m");

        let entry = cursor.begin_pass();
        self.move_to(&entry)?;

        let mut captures = 0;
        while cursor.within_sweep(self.params.building_width) {
            self.check_cancelled()?;
            let path = self.capture_image(cursor)?;
            log.images.push(path);
            captures += 1;

            let next = cursor.advance(geometry.horizontal_capture_interval);
            debug!("Y val of current position: {:.3}", next.y);
            self.move_to(&next)?;
        }

        let measured = self.read_position()?;
        cursor.complete_pass(measured, self.params.lateral_overlap);
        Ok(PassRecord {
            index,
            direction,
            altitude_band,
            captures,
            end_position: measured,
        })
    }

    /// Hover, let the airframe settle, grab one frame and hand it to the sink.
    /// The snapshot index only advances once the frame is stored.
    fn capture_image(&mut self, cursor: &mut FlightCursor) -> Result<PathBuf, ScanError> {
        let index = cursor.snapshot_index();
        let timeout = self.flight.command_timeout();
        self.command(VehicleCommand::Hover, |v| v.hover(timeout))?;
        debug!("Drone hovering...");
        self.vehicle.settle(self.flight.settle_delay());

        let request = self.flight.image_request();
        let frame = self
            .vehicle
            .capture_image(&request)
            .map_err(|e| match e {
                VehicleError::Timeout { command, timeout } => {
                    ScanError::Timeout { command, timeout }
                }
                other => ScanError::CaptureFailure {
                    index,
                    source: CaptureError::Frame(other),
                },
            })?;
        let path = self
            .sink
            .store(index, &frame)
            .map_err(|source| ScanError::CaptureFailure { index, source })?;

        cursor.commit_snapshot();
        info!("Saved snapshot: {}", path.display());
        Ok(path)
    }

    fn move_to(&mut self, target: &ScanPoint) -> Result<(), ScanError> {
        let ned = scan_to_ned(target);
        let speed = self.flight.speed;
        let timeout = self.flight.command_timeout();
        self.command(VehicleCommand::MoveToPosition, |v| {
            v.move_to_position(ned, speed, timeout)
        })
    }

    fn read_position(&mut self) -> Result<ScanPoint, ScanError> {
        let ned = self.command(VehicleCommand::ReadPosition, |v| v.position())?;
        Ok(ned_to_scan(&ned))
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn command<T>(
        &mut self,
        command: VehicleCommand,
        f: impl FnOnce(&mut V) -> Result<T, VehicleError>,
    ) -> Result<T, ScanError> {
        f(&mut self.vehicle).map_err(|e| ScanError::from_vehicle(command, e))
    }

    /// Before the vehicle is armed, any failure means it cannot be driven.
    fn init_command(
        &mut self,
        command: VehicleCommand,
        f: impl FnOnce(&mut V) -> Result<(), VehicleError>,
    ) -> Result<(), ScanError> {
        f(&mut self.vehicle).map_err(|source| ScanError::ConnectionFailure { command, source })
    }

    // --- Cleanup ---

    /// Brings the vehicle to rest according to why the flight ended, then
    /// disarms and releases it. Failures here are logged, never raised.
    fn secure_vehicle(&mut self, state: &mut VehicleState, error: Option<&ScanError>) {
        let timeout = self.flight.command_timeout();

        if state.airborne && !state.at_origin {
            match error.map(ScanError::kind) {
                Some(AbortReason::CaptureFailure) | Some(AbortReason::Cancelled) => {
                    info!("Returning to origin before shutdown");
                    let speed = self.flight.speed;
                    if let Err(e) = self
                        .vehicle
                        .move_to_position(NedPoint::ORIGIN, speed, timeout)
                    {
                        warn!("Return to origin failed ({e}); landing in place");
                        self.land_in_place(timeout);
                    }
                }
                _ => self.land_in_place(timeout),
            }
            state.airborne = false;
        }

        if state.armed {
            info!("Disarming.");
            match self.vehicle.arm_disarm(false) {
                Ok(()) => state.armed = false,
                Err(e) => warn!("`{}` failed: {e}", VehicleCommand::Disarm),
            }
        }
        if state.api_control {
            match self.vehicle.enable_api_control(false) {
                Ok(()) => state.api_control = false,
                Err(e) => warn!("`{}` failed: {e}", VehicleCommand::DisableApiControl),
            }
        }
    }

    fn land_in_place(&mut self, timeout: Duration) {
        info!("Landing in place");
        if let Err(e) = self.vehicle.land(timeout) {
            warn!("Landing failed: {e}");
        }
    }
}
