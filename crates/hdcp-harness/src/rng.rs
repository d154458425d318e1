//! Seeded random source.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hdcp_core::error::CollaboratorError;
use hdcp_core::rng::RandomSource;

/// Deterministic [`RandomSource`]: the same seed replays the same
/// nonces and keys.
pub struct SeededRandom(ChaCha8Rng);

impl SeededRandom {
    /// A source seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn setup(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) {
        self.0.fill_bytes(buf);
    }
}
