// facade_core/src/policy.rs

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// What the executor should do after a pass has been flown and the altitude
/// band has been shrunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDecision {
    /// Fly another pass and ask again.
    Continue,
    /// Fly exactly one more pass, then stop without asking again.
    FinalPass,
    /// Stop sweeping and return home.
    Terminate,
}

// --- TERMINATION POLICY TRAIT ---
/// Decides when the vertical coverage of the facade is exhausted.
///
/// Policies are consulted once per completed pass with the *already shrunk*
/// altitude band and the vertical footprint measured at the start of the
/// flight.
pub trait TerminationPolicy: DynClone + Debug + Send + Sync {
    /// Short stable name used in logs and reports.
    fn name(&self) -> &'static str;

    fn decide(&self, altitude_band: f64, vertical_coverage: f64) -> PassDecision;
}

dyn_clone::clone_trait_object!(TerminationPolicy);

/// Keeps sweeping while the band stays at or above `fraction` of the vertical
/// footprint.
#[derive(Debug, Clone)]
pub struct CoverageFloor {
    pub fraction: f64,
}

impl TerminationPolicy for CoverageFloor {
    fn name(&self) -> &'static str {
        "coverage-floor"
    }

    fn decide(&self, altitude_band: f64, vertical_coverage: f64) -> PassDecision {
        if altitude_band >= vertical_coverage * self.fraction {
            PassDecision::Continue
        } else {
            PassDecision::Terminate
        }
    }
}

/// Keeps sweeping while the band stays below `fraction` of the vertical
/// footprint; once it is not, one closing pass is flown in the opposite
/// direction.
///
/// A band that starts below the threshold only shrinks further, so this
/// policy relies on the executor's ground-clearance and pass-count limits to
/// end such a flight.
#[derive(Debug, Clone)]
pub struct CoverageCeiling {
    pub fraction: f64,
}

impl TerminationPolicy for CoverageCeiling {
    fn name(&self) -> &'static str {
        "coverage-ceiling"
    }

    fn decide(&self, altitude_band: f64, vertical_coverage: f64) -> PassDecision {
        if altitude_band < vertical_coverage * self.fraction {
            PassDecision::Continue
        } else {
            PassDecision::FinalPass
        }
    }
}

// =========================================================================
// == Configuration ==
// =========================================================================

/// Serializable selector for the termination policy. The `kind` field in TOML
/// picks the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum TerminationPolicyKind {
    CoverageFloor {
        #[serde(default = "default_floor_fraction")]
        fraction: f64,
    },
    CoverageCeiling {
        #[serde(default = "default_ceiling_fraction")]
        fraction: f64,
    },
}

fn default_floor_fraction() -> f64 {
    TerminationPolicyKind::DEFAULT_FLOOR_FRACTION
}

fn default_ceiling_fraction() -> f64 {
    TerminationPolicyKind::DEFAULT_CEILING_FRACTION
}

impl TerminationPolicyKind {
    pub const DEFAULT_FLOOR_FRACTION: f64 = 0.25;
    pub const DEFAULT_CEILING_FRACTION: f64 = 0.5;

    pub fn build(&self) -> Box<dyn TerminationPolicy> {
        match *self {
            TerminationPolicyKind::CoverageFloor { fraction } => {
                Box::new(CoverageFloor { fraction })
            }
            TerminationPolicyKind::CoverageCeiling { fraction } => {
                Box::new(CoverageCeiling { fraction })
            }
        }
    }

    pub fn fraction(&self) -> f64 {
        match *self {
            TerminationPolicyKind::CoverageFloor { fraction }
            | TerminationPolicyKind::CoverageCeiling { fraction } => fraction,
        }
    }
}

impl Default for TerminationPolicyKind {
    fn default() -> Self {
        TerminationPolicyKind::CoverageFloor {
            fraction: Self::DEFAULT_FLOOR_FRACTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_continues_down_to_a_quarter_of_coverage() {
        let policy = CoverageFloor { fraction: 0.25 };
        assert_eq!(policy.decide(2.5, 10.0), PassDecision::Continue);
        assert_eq!(policy.decide(2.49, 10.0), PassDecision::Terminate);
    }

    #[test]
    fn ceiling_asks_for_a_closing_pass_at_half_coverage() {
        let policy = CoverageCeiling { fraction: 0.5 };
        assert_eq!(policy.decide(4.9, 10.0), PassDecision::Continue);
        assert_eq!(policy.decide(5.0, 10.0), PassDecision::FinalPass);
        assert_eq!(policy.decide(13.0, 10.0), PassDecision::FinalPass);
    }

    #[test]
    fn kinds_build_the_named_policy() {
        let floor = TerminationPolicyKind::default().build();
        assert_eq!(floor.name(), "coverage-floor");

        let ceiling = TerminationPolicyKind::CoverageCeiling { fraction: 0.5 }.build();
        assert_eq!(ceiling.name(), "coverage-ceiling");

        // Boxed policies are cloneable through dyn-clone.
        let copy = ceiling.clone();
        assert_eq!(copy.decide(1.0, 10.0), PassDecision::Continue);
    }
}
