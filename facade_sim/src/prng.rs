// facade_sim/src/prng.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The single deterministic pseudo-random number generator behind every noise
/// source of the simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    /// Seeded runs are reproducible; without a seed the OS entropy source is
    /// used.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }
}
