// facade_core/src/testing.rs

//! Test doubles for the vehicle and the image sink. Compiled for unit tests
//! only.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::capture::{snapshot_stem, CaptureError, ImageSink};
use crate::frames::NedPoint;
use crate::vehicle::{ImageRequest, VehicleClient, VehicleCommand, VehicleError};

/// One observed interaction with the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConfirmConnection,
    ApiControl(bool),
    Arm(bool),
    Takeoff,
    MoveTo(NedPoint),
    Hover,
    Land,
    Position,
    Distance(String),
    Capture,
    Settle(Duration),
}

/// A vehicle that records every call, moves exactly to each target (plus a
/// fixed drift), and fails on demand.
#[derive(Debug)]
pub struct MockVehicle {
    pub calls: Vec<Call>,
    pub position: NedPoint,
    pub standoff: f64,
    /// Added to every move target on arrival.
    pub drift: NedPoint,
    /// Fails the n-th (0-based) occurrence of a command with the given error.
    pub fail_on: Option<(VehicleCommand, usize, VehicleError)>,
    /// Cancels the token once this many frames have been handed out.
    pub cancel_after_captures: Option<(usize, CancellationToken)>,
    counts: HashMap<VehicleCommand, usize>,
}

impl MockVehicle {
    pub fn new(standoff: f64) -> Self {
        Self {
            calls: Vec::new(),
            position: NedPoint::ORIGIN,
            standoff,
            drift: NedPoint::ORIGIN,
            fail_on: None,
            cancel_after_captures: None,
            counts: HashMap::new(),
        }
    }

    pub fn failing(mut self, command: VehicleCommand, occurrence: usize, error: VehicleError) -> Self {
        self.fail_on = Some((command, occurrence, error));
        self
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn moves(&self) -> Vec<NedPoint> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::MoveTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: Call, command: VehicleCommand) -> Result<(), VehicleError> {
        self.calls.push(call);
        let seen = self.counts.entry(command).or_insert(0);
        let occurrence = *seen;
        *seen += 1;
        match &self.fail_on {
            Some((cmd, n, err)) if *cmd == command && *n == occurrence => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

impl VehicleClient for MockVehicle {
    fn confirm_connection(&mut self) -> Result<(), VehicleError> {
        self.record(Call::ConfirmConnection, VehicleCommand::ConfirmConnection)
    }

    fn enable_api_control(&mut self, enabled: bool) -> Result<(), VehicleError> {
        let command = if enabled {
            VehicleCommand::EnableApiControl
        } else {
            VehicleCommand::DisableApiControl
        };
        self.record(Call::ApiControl(enabled), command)
    }

    fn arm_disarm(&mut self, arm: bool) -> Result<(), VehicleError> {
        let command = if arm {
            VehicleCommand::Arm
        } else {
            VehicleCommand::Disarm
        };
        self.record(Call::Arm(arm), command)
    }

    fn takeoff(&mut self, _timeout: Duration) -> Result<(), VehicleError> {
        self.record(Call::Takeoff, VehicleCommand::Takeoff)?;
        self.position.z = -3.0;
        Ok(())
    }

    fn move_to_position(
        &mut self,
        target: NedPoint,
        _speed: f64,
        _timeout: Duration,
    ) -> Result<(), VehicleError> {
        self.record(Call::MoveTo(target), VehicleCommand::MoveToPosition)?;
        self.position = NedPoint::new(
            target.x + self.drift.x,
            target.y + self.drift.y,
            target.z + self.drift.z,
        );
        Ok(())
    }

    fn hover(&mut self, _timeout: Duration) -> Result<(), VehicleError> {
        self.record(Call::Hover, VehicleCommand::Hover)
    }

    fn land(&mut self, _timeout: Duration) -> Result<(), VehicleError> {
        self.record(Call::Land, VehicleCommand::Land)?;
        self.position.z = 0.0;
        Ok(())
    }

    fn position(&mut self) -> Result<NedPoint, VehicleError> {
        self.record(Call::Position, VehicleCommand::ReadPosition)?;
        Ok(self.position)
    }

    fn distance(&mut self, sensor_name: &str) -> Result<f64, VehicleError> {
        self.record(
            Call::Distance(sensor_name.to_string()),
            VehicleCommand::ReadDistance,
        )?;
        Ok(self.standoff)
    }

    fn capture_image(&mut self, _request: &ImageRequest) -> Result<Vec<u8>, VehicleError> {
        self.record(Call::Capture, VehicleCommand::CaptureImage)?;
        let captured = self.count(|c| *c == Call::Capture);
        if let Some((after, token)) = &self.cancel_after_captures {
            if captured >= *after {
                token.cancel();
            }
        }
        Ok(vec![0xAB; 16])
    }

    fn settle(&mut self, delay: Duration) {
        self.calls.push(Call::Settle(delay));
    }
}

/// Keeps frames in memory; optionally refuses the frame with a given index.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub stored: Vec<(u64, usize)>,
    pub fail_at: Option<u64>,
}

impl ImageSink for MemorySink {
    fn store(&mut self, index: u64, frame: &[u8]) -> Result<PathBuf, CaptureError> {
        let path = PathBuf::from(format!("mem/{}.png", snapshot_stem(index)));
        if self.fail_at == Some(index) {
            return Err(CaptureError::Write {
                path,
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.stored.push((index, frame.len()));
        Ok(path)
    }
}
