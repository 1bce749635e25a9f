// facade_sim/src/mission.rs

use log::{info, warn};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use facade_core::cancel::CancellationToken;
use facade_core::capture::FileImageSink;
use facade_core::executor::{ScanExecutor, ScanReport};

use crate::config::MissionConfig;
use crate::vehicle::{SimulatedMultirotor, SimulationError};

/// Failures that stop a mission before the vehicle is ever commanded.
#[derive(Error, Debug)]
pub enum MissionError {
    #[error("failed to set up the simulated vehicle: {0}")]
    Simulation(#[from] SimulationError),

    #[error("failed to prepare output directory {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct MissionOutcome {
    pub report: ScanReport,
    /// Where the trajectory log was written, if it was.
    pub trajectory_path: Option<PathBuf>,
    /// Virtual time from spawn to the last command.
    pub flight_time: Duration,
}

/// Flies one scan against the simulated vehicle described by `config`,
/// writing photos and the trajectory log into the output directory.
///
/// An aborted scan is still `Ok`; its reason is in the report.
pub fn run_mission(
    config: &MissionConfig,
    cancel: CancellationToken,
) -> Result<MissionOutcome, MissionError> {
    let vehicle = SimulatedMultirotor::from_config(config)?;

    let directory = &config.output.directory;
    let sink = FileImageSink::new(directory, &config.output.image_extension).map_err(|source| {
        MissionError::Output {
            path: directory.clone(),
            source,
        }
    })?;
    info!("Saving images to {}", directory.display());

    let termination = config.termination();
    info!("Termination policy: {termination:?}");
    let mut executor = ScanExecutor::new(
        vehicle,
        sink,
        config.scan.clone(),
        config.flight.clone(),
        termination.build(),
    )
    .with_cancellation(cancel);

    let report = executor.run();
    let (vehicle, _) = executor.into_parts();
    let flight_time = vehicle.clock();

    let trajectory_path = if config.output.record_trajectory {
        let path = directory.join(&config.output.trajectory_file);
        match vehicle.trajectory().write_to(&path) {
            Ok(()) => {
                info!(
                    "Wrote {} trajectory samples to {}",
                    vehicle.trajectory().len(),
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                warn!("Could not write trajectory log {}: {e}", path.display());
                None
            }
        }
    } else {
        None
    };

    Ok(MissionOutcome {
        report,
        trajectory_path,
        flight_time,
    })
}
