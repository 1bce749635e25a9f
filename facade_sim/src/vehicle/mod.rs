// facade_sim/src/vehicle/mod.rs

//! A kinematic multirotor standing in for the simulator's RPC client.
//!
//! Moves complete instantly in wall-clock time but advance a virtual clock by
//! the travel time at the commanded speed. Arrival positions, range readings
//! and the trajectory recording all run off one seeded RNG.

pub mod camera;

use log::{debug, warn};
use rand_distr::{Distribution, Normal, NormalError};
use std::time::Duration;
use thiserror::Error;

use facade_core::frames::NedPoint;
use facade_core::telemetry::{TrajectoryLog, TrajectorySample};
use facade_core::vehicle::{ImageRequest, VehicleClient, VehicleCommand, VehicleError};

use crate::config::{FaultConfig, MissionConfig};
use crate::prng::SimulationRng;
use camera::SceneCamera;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("invalid noise distribution: {0}")]
    Noise(#[from] NormalError),
}

#[derive(Debug)]
pub struct SimulatedMultirotor {
    name: String,
    distance_sensor: String,
    camera_name: String,
    camera: SceneCamera,
    wall_x: f64,
    takeoff_altitude: f64,
    vertical_speed: f64,
    faults: FaultConfig,

    rng: SimulationRng,
    drift: Normal<f64>,
    range_noise: Normal<f64>,

    connected: bool,
    api_control: bool,
    armed: bool,
    airborne: bool,
    position: NedPoint,
    clock: Duration,
    moves_completed: u32,
    trajectory: TrajectoryLog,
}

impl SimulatedMultirotor {
    pub fn from_config(config: &MissionConfig) -> Result<Self, SimulationError> {
        let sim = &config.simulation;
        let camera = SceneCamera::new(
            sim.frame_width,
            sim.frame_height,
            config.scan.camera_horizontal_fov_deg,
            config.scan.building_width,
            config.scan.building_height,
        );

        let mut vehicle = Self {
            name: config.flight.vehicle_name.clone(),
            distance_sensor: config.flight.distance_sensor.clone(),
            camera_name: config.flight.camera_name.clone(),
            camera,
            wall_x: sim.wall_distance,
            takeoff_altitude: sim.takeoff_altitude,
            vertical_speed: sim.vertical_speed,
            faults: sim.faults.clone(),
            rng: SimulationRng::new(sim.seed),
            drift: Normal::new(0.0, sim.drift_stddev)?,
            range_noise: Normal::new(0.0, sim.range_noise_stddev)?,
            connected: false,
            api_control: false,
            armed: false,
            airborne: false,
            position: NedPoint::ORIGIN,
            clock: Duration::ZERO,
            moves_completed: 0,
            trajectory: TrajectoryLog::new(),
        };
        vehicle.record();
        Ok(vehicle)
    }

    /// Virtual time elapsed since the vehicle was created.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn trajectory(&self) -> &TrajectoryLog {
        &self.trajectory
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_api_control(&self) -> bool {
        self.api_control
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn moves_completed(&self) -> u32 {
        self.moves_completed
    }

    fn record(&mut self) {
        self.trajectory.push(TrajectorySample {
            vehicle_name: self.name.clone(),
            timestamp_ms: self.clock.as_millis() as u64,
            position: self.position,
        });
    }

    fn sample_drift(&mut self) -> f64 {
        self.drift.sample(&mut self.rng.0)
    }

    // --- Preconditions, mirroring what the simulator's RPC server refuses ---

    fn require_connection(&self) -> Result<(), VehicleError> {
        if self.connected {
            Ok(())
        } else {
            Err(VehicleError::Disconnected(format!(
                "vehicle '{}' is not connected",
                self.name
            )))
        }
    }

    fn require_control(&self, command: VehicleCommand) -> Result<(), VehicleError> {
        self.require_connection()?;
        if self.api_control {
            Ok(())
        } else {
            Err(VehicleError::Rejected {
                command,
                reason: "API control is not enabled".into(),
            })
        }
    }

    fn require_flight(&self, command: VehicleCommand) -> Result<(), VehicleError> {
        self.require_control(command)?;
        if !self.armed {
            return Err(VehicleError::Rejected {
                command,
                reason: "vehicle is not armed".into(),
            });
        }
        if !self.airborne {
            return Err(VehicleError::Rejected {
                command,
                reason: "vehicle is on the ground".into(),
            });
        }
        Ok(())
    }

    /// Advances the clock for a command taking `needed`; a command longer
    /// than `timeout` uses up the timeout and fails.
    fn spend(
        &mut self,
        command: VehicleCommand,
        needed: Duration,
        timeout: Duration,
    ) -> Result<(), VehicleError> {
        if needed > timeout {
            self.clock = self.clock.saturating_add(timeout);
            return Err(VehicleError::Timeout { command, timeout });
        }
        self.clock += needed;
        Ok(())
    }

    fn vertical_time(&self, meters: f64) -> Duration {
        Duration::try_from_secs_f64(meters.abs() / self.vertical_speed).unwrap_or(Duration::MAX)
    }
}

impl VehicleClient for SimulatedMultirotor {
    fn confirm_connection(&mut self) -> Result<(), VehicleError> {
        if self.faults.refuse_connection {
            return Err(VehicleError::Disconnected("connection refused".into()));
        }
        self.connected = true;
        debug!("Connected to simulated vehicle '{}'", self.name);
        Ok(())
    }

    fn enable_api_control(&mut self, enabled: bool) -> Result<(), VehicleError> {
        self.require_connection()?;
        self.api_control = enabled;
        Ok(())
    }

    fn arm_disarm(&mut self, arm: bool) -> Result<(), VehicleError> {
        let command = if arm {
            VehicleCommand::Arm
        } else {
            VehicleCommand::Disarm
        };
        self.require_control(command)?;
        if !arm && self.airborne {
            warn!("Disarming '{}' in flight", self.name);
            self.airborne = false;
            self.position.z = 0.0;
            self.record();
        }
        self.armed = arm;
        Ok(())
    }

    fn takeoff(&mut self, timeout: Duration) -> Result<(), VehicleError> {
        let command = VehicleCommand::Takeoff;
        self.require_control(command)?;
        if !self.armed {
            return Err(VehicleError::Rejected {
                command,
                reason: "vehicle is not armed".into(),
            });
        }
        let climb = self.takeoff_altitude + self.position.z;
        self.spend(command, self.vertical_time(climb), timeout)?;
        self.airborne = true;
        self.position.z = -self.takeoff_altitude;
        self.record();
        Ok(())
    }

    fn move_to_position(
        &mut self,
        target: NedPoint,
        speed: f64,
        timeout: Duration,
    ) -> Result<(), VehicleError> {
        let command = VehicleCommand::MoveToPosition;
        self.require_flight(command)?;
        if !(speed > 0.0) {
            return Err(VehicleError::Rejected {
                command,
                reason: format!("speed {speed} is not positive"),
            });
        }
        if let Some(limit) = self.faults.stall_after_moves {
            if self.moves_completed >= limit {
                self.clock = self.clock.saturating_add(timeout);
                return Err(VehicleError::Timeout { command, timeout });
            }
        }

        let travel = Duration::try_from_secs_f64(self.position.distance_to(&target) / speed)
            .unwrap_or(Duration::MAX);
        self.spend(command, travel, timeout)?;

        let x = target.x + self.sample_drift();
        let y = target.y + self.sample_drift();
        let z = (target.z + self.sample_drift()).min(0.0);
        self.position = NedPoint::new(x, y, z);
        if target.z >= 0.0 {
            // Commanded to ground level: touch down.
            self.position.z = 0.0;
            self.airborne = false;
        }
        self.moves_completed += 1;
        self.record();
        Ok(())
    }

    fn hover(&mut self, _timeout: Duration) -> Result<(), VehicleError> {
        self.require_flight(VehicleCommand::Hover)
    }

    fn land(&mut self, timeout: Duration) -> Result<(), VehicleError> {
        let command = VehicleCommand::Land;
        self.require_control(command)?;
        if !self.airborne {
            return Ok(());
        }
        self.spend(command, self.vertical_time(self.position.z), timeout)?;
        self.airborne = false;
        self.position.z = 0.0;
        self.record();
        Ok(())
    }

    fn position(&mut self) -> Result<NedPoint, VehicleError> {
        self.require_connection()?;
        Ok(self.position)
    }

    fn distance(&mut self, sensor_name: &str) -> Result<f64, VehicleError> {
        self.require_connection()?;
        if sensor_name != self.distance_sensor {
            return Err(VehicleError::Unavailable(format!(
                "no distance sensor named '{sensor_name}'"
            )));
        }
        let truth = (self.wall_x - self.position.x).max(0.0);
        let reading = truth + self.range_noise.sample(&mut self.rng.0);
        Ok(reading.max(0.0))
    }

    fn capture_image(&mut self, request: &ImageRequest) -> Result<Vec<u8>, VehicleError> {
        self.require_connection()?;
        if self.faults.camera_offline {
            return Err(VehicleError::Unavailable("camera offline".into()));
        }
        if request.camera_name != self.camera_name {
            return Err(VehicleError::Unavailable(format!(
                "no camera named '{}'",
                request.camera_name
            )));
        }
        Ok(self
            .camera
            .render(&self.position, self.wall_x, request.image_type))
    }

    fn settle(&mut self, delay: Duration) {
        self.clock = self.clock.saturating_add(delay);
    }
}
