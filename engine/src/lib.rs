use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub mod config;
pub mod error;
pub mod request;
pub mod roll;

pub use config::EngineConfig;
pub use error::RollError;
pub use request::{RollRequest, Violation};
pub use roll::{RollEngine, RollResult};

/// A single generator instance. Each worker owns exactly one.
pub struct Dice {
    rng: ChaCha20Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha20Rng::seed_from_u64(seed) }
    }

    /// Seed a fresh generator from the operating system's random source.
    pub fn from_os() -> Result<Self, RollError> {
        let rng = ChaCha20Rng::from_rng(OsRng).map_err(RollError::Entropy)?;
        Ok(Self { rng })
    }

    /// Uniform draw in `1..=sides`.
    pub fn roll(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides)
    }
}

/// Hands out the generator a worker will own for the duration of a roll.
pub trait EntropySource: Sync {
    fn generator(&self, worker: usize) -> Result<Dice, RollError>;
}

/// Production source: every generator is seeded independently from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn generator(&self, _worker: usize) -> Result<Dice, RollError> {
        Dice::from_os()
    }
}

/// Reproducible source. Worker `i` reads stream `i` of the same key.
#[derive(Debug, Clone, Copy)]
pub struct SeededEntropy {
    pub seed: u64,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl EntropySource for SeededEntropy {
    fn generator(&self, worker: usize) -> Result<Dice, RollError> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        rng.set_stream(worker as u64);
        Ok(Dice { rng })
    }
}
