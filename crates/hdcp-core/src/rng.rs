//! Entropy seam.

use crate::error::CollaboratorError;

/// Source of the protocol's nonces and keys.
///
/// Production integrations back this with a hardware RNG; test drivers
/// use a seeded generator for reproducibility.
pub trait RandomSource: Send {
    /// One-time initialization.
    fn setup(&mut self) -> Result<(), CollaboratorError>;

    /// Fills `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}
