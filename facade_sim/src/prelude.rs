// facade_sim/src/prelude.rs

// Re-export the entire facade_core prelude so binaries and tests reach the
// planning types through one import.
pub use facade_core::prelude::*;

// Simulation-specific types.
pub use crate::config::{
    load_mission_config, ConfigError, ConfigOverrides, FaultConfig, MissionConfig, OutputConfig,
    SimulationConfig,
};
pub use crate::mission::{run_mission, MissionError, MissionOutcome};
pub use crate::vehicle::{SimulatedMultirotor, SimulationError};
