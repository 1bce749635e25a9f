// facade_sim/src/cli.rs

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use facade_core::params::ScanPreset;
use facade_core::policy::TerminationPolicyKind;

use crate::config::ConfigOverrides;

/// facade-scan: photograph a building facade with a simulated multirotor.
///
/// Flies a serpentine pattern in front of the facade, one horizontal pass per
/// altitude band, and saves one image per capture point.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fly a facade scan.
    Scan(ScanArgs),
    /// Summarize a recorded trajectory log.
    Trajectory(TrajectoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Mission TOML file layered over the preset.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parameter preset the other layers start from.
    #[arg(long, value_enum, default_value_t = PresetArg::Relaxed)]
    pub preset: PresetArg,

    /// Facade width covered by every pass, meters [preset default: 26].
    #[arg(long)]
    pub width: Option<f64>,

    /// Altitude of the first pass, meters [preset default: 13 relaxed, 11 dense].
    #[arg(long)]
    pub altitude: Option<f64>,

    /// Nominal facade height, meters [preset default: 12].
    #[arg(long)]
    pub height: Option<f64>,

    /// When to stop adding passes.
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Directory for photos and the trajectory log.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Seed for the simulator's noise.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the effective configuration as TOML and exit without flying.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,
}

impl ScanArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            building_width: self.width,
            initial_altitude: self.altitude,
            building_height: self.height,
            termination: self.policy.map(PolicyArg::kind),
            output_dir: self.output_dir.clone(),
            seed: self.seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TrajectoryArgs {
    /// Whitespace-separated log with POS_X, POS_Y and POS_Z columns.
    pub path: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetArg {
    Dense,
    Relaxed,
}

impl From<PresetArg> for ScanPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Dense => ScanPreset::Dense,
            PresetArg::Relaxed => ScanPreset::Relaxed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Continue while the band is at least a quarter of the vertical coverage.
    CoverageFloor,
    /// Continue while the band is under half the vertical coverage, then fly
    /// one closing pass.
    CoverageCeiling,
}

impl PolicyArg {
    pub fn kind(self) -> TerminationPolicyKind {
        match self {
            PolicyArg::CoverageFloor => TerminationPolicyKind::CoverageFloor {
                fraction: TerminationPolicyKind::DEFAULT_FLOOR_FRACTION,
            },
            PolicyArg::CoverageCeiling => TerminationPolicyKind::CoverageCeiling {
                fraction: TerminationPolicyKind::DEFAULT_CEILING_FRACTION,
            },
        }
    }
}
