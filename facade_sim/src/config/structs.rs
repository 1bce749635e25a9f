// facade_sim/src/config/structs.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use facade_core::params::{FlightSettings, ScanParameters, ScanPreset};
use facade_core::policy::TerminationPolicyKind;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # MissionConfig
/// Everything one run of `facade-scan` needs. This struct is the root of the
/// data parsed from a mission TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct MissionConfig {
    #[serde(default)]
    pub scan: ScanParameters,

    #[serde(default)]
    pub flight: FlightSettings,

    /// Left unset, the preset's policy applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationPolicyKind>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl MissionConfig {
    pub fn from_preset(preset: ScanPreset) -> Self {
        Self {
            scan: preset.parameters(),
            ..Self::default()
        }
    }

    pub fn termination(&self) -> TerminationPolicyKind {
        self.termination.clone().unwrap_or_default()
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    /// Photos and the trajectory log land here.
    pub directory: PathBuf,
    pub image_extension: String,
    pub record_trajectory: bool,
    pub trajectory_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scan_output".into(),
            image_extension: "ppm".to_string(),
            record_trajectory: true,
            trajectory_file: "airsim_rec.txt".to_string(),
        }
    }
}

/// The simulated world and airframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Optional seed for the pseudo-random number generator for determinism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Distance from the takeoff point to the facade plane along +X, meters.
    pub wall_distance: f64,
    /// Standard deviation of the position error on arrival, meters per axis.
    pub drift_stddev: f64,
    /// Standard deviation of the range-sensor noise, meters.
    pub range_noise_stddev: f64,
    /// Height reached by the takeoff command, meters.
    pub takeoff_altitude: f64,
    /// Vertical speed used for takeoff and landing, m/s.
    pub vertical_speed: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub faults: FaultConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            wall_distance: 10.0,
            drift_stddev: 0.05,
            range_noise_stddev: 0.02,
            takeoff_altitude: 3.0,
            vertical_speed: 1.0,
            frame_width: 256,
            frame_height: 128,
            faults: FaultConfig::default(),
        }
    }
}

/// Failures the simulated vehicle can be told to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct FaultConfig {
    pub refuse_connection: bool,
    /// Every move after this many completed moves times out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stall_after_moves: Option<u32>,
    pub camera_offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: MissionConfig = toml::from_str("").unwrap();
        assert_eq!(config, MissionConfig::default());
        assert_eq!(config.output.image_extension, "ppm");
        assert!(config.termination.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: MissionConfig = toml::from_str(
            r#"
            [scan]
            building_width = 40.0

            [termination]
            kind = "CoverageCeiling"

            [simulation.faults]
            stall_after_moves = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.building_width, 40.0);
        assert_eq!(config.scan.initial_altitude, 11.0);
        assert_eq!(
            config.termination(),
            TerminationPolicyKind::CoverageCeiling { fraction: 0.5 }
        );
        assert_eq!(config.simulation.faults.stall_after_moves, Some(4));
        assert!(!config.simulation.faults.refuse_connection);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<MissionConfig>("[scan]\nbuilding_widht = 3.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn relaxed_preset_changes_scan_only() {
        let config = MissionConfig::from_preset(ScanPreset::Relaxed);
        assert_eq!(config.scan.initial_altitude, 13.0);
        assert_eq!(config.flight, FlightSettings::default());
    }
}
