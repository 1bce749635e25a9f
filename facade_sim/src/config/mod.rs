// facade_sim/src/config/mod.rs

//! Loading, layering and validating the mission configuration.
//!
//! Layers, lowest priority first: the preset's defaults, an optional TOML
//! file, `FACADE_`-prefixed environment variables (`__` separates nested
//! keys, e.g. `FACADE_SCAN__BUILDING_WIDTH=30`), then command-line flags.

pub mod structs;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

use facade_core::geometry::GeometryError;
use facade_core::params::ScanPreset;
use facade_core::policy::TerminationPolicyKind;

pub use structs::{FaultConfig, MissionConfig, OutputConfig, SimulationConfig};

pub const ENV_PREFIX: &str = "FACADE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid scan parameters: {0}")]
    Geometry(#[from] GeometryError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Values given explicitly on the command line. They override every other
/// layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub building_width: Option<f64>,
    pub initial_altitude: Option<f64>,
    pub building_height: Option<f64>,
    pub termination: Option<TerminationPolicyKind>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, mut figment: Figment) -> Figment {
        if let Some(v) = self.building_width {
            figment = figment.merge(Serialized::default("scan.building_width", v));
        }
        if let Some(v) = self.initial_altitude {
            figment = figment.merge(Serialized::default("scan.initial_altitude", v));
        }
        if let Some(v) = self.building_height {
            figment = figment.merge(Serialized::default("scan.building_height", v));
        }
        if let Some(kind) = &self.termination {
            figment = figment.merge(Serialized::default("termination", kind));
        }
        if let Some(dir) = &self.output_dir {
            figment = figment.merge(Serialized::default("output.directory", dir));
        }
        if let Some(seed) = self.seed {
            figment = figment.merge(Serialized::default("simulation.seed", seed));
        }
        figment
    }
}

/// Builds the layered figment without extracting it.
pub fn mission_figment(
    preset: ScanPreset,
    file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(MissionConfig::from_preset(preset)));
    if let Some(path) = file {
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        info!("Loading mission from: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
    Ok(overrides.apply(figment))
}

/// Loads, resolves and validates the mission configuration.
pub fn load_mission_config(
    preset: ScanPreset,
    file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<MissionConfig, ConfigError> {
    let mut config: MissionConfig = mission_figment(preset, file, overrides)?.extract()?;
    config
        .termination
        .get_or_insert_with(|| preset.termination());
    config.validate()?;
    Ok(config)
}

impl MissionConfig {
    /// Rejects values that would make the flight meaningless or the
    /// simulation undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;

        let flight = &self.flight;
        positive("flight.speed", flight.speed)?;
        non_negative("flight.settle_delay_secs", flight.settle_delay_secs)?;
        positive("flight.command_timeout_secs", flight.command_timeout_secs)?;
        positive("flight.max_standoff", flight.max_standoff)?;
        non_negative("flight.min_altitude", flight.min_altitude)?;
        if self.scan.initial_altitude < flight.min_altitude {
            return Err(ConfigError::Invalid(format!(
                "scan.initial_altitude {} is below flight.min_altitude {}",
                self.scan.initial_altitude, flight.min_altitude
            )));
        }
        if flight.max_passes == 0 {
            return Err(ConfigError::Invalid(
                "flight.max_passes must be at least 1".into(),
            ));
        }

        positive("termination.fraction", self.termination().fraction())?;

        if self.output.image_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid(
                "output.image_extension must not be empty".into(),
            ));
        }
        if self.output.record_trajectory && self.output.trajectory_file.is_empty() {
            return Err(ConfigError::Invalid(
                "output.trajectory_file must not be empty".into(),
            ));
        }

        let sim = &self.simulation;
        non_negative("simulation.wall_distance", sim.wall_distance)?;
        non_negative("simulation.drift_stddev", sim.drift_stddev)?;
        non_negative("simulation.range_noise_stddev", sim.range_noise_stddev)?;
        non_negative("simulation.takeoff_altitude", sim.takeoff_altitude)?;
        positive("simulation.vertical_speed", sim.vertical_speed)?;
        if sim.frame_width == 0 || sim.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size {}x{} has no pixels",
                sim.frame_width, sim.frame_height
            )));
        }
        Ok(())
    }

    /// The effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}
