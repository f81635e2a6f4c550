//! Capability interface shared by every engine policy
//!
//! The distribution layer ([`crate::rng::Distributions`]) is written against
//! this trait only, so it never depends on how the state is stored or guarded.

use super::RngError;

/// Seedable source of tempered 32-bit words with explicit state I/O
pub trait RandomEngine {
    /// Return the top `bits` bits (1..=32) of the next tempered word.
    ///
    /// This is the single primitive every derived draw consumes.
    fn next_bits(&mut self, bits: u32) -> u32;

    /// Reseed from a scalar. Only the low 32 bits are significant.
    fn seed(&mut self, seed: i64);

    /// Reseed from a non-empty array of words.
    ///
    /// # Errors
    /// [`RngError::InvalidSeed`] if `key` is empty.
    fn seed_from_slice(&mut self, key: &[i32]) -> Result<(), RngError>;

    /// Take the pending second Gaussian deviate, if any, leaving none behind.
    fn take_cached_gaussian(&mut self) -> Option<f64>;

    /// Store the second Gaussian deviate of a polar-method pair.
    fn cache_gaussian(&mut self, value: f64);

    /// Discard the pending Gaussian deviate.
    fn clear_gaussian_cache(&mut self);

    /// Encode the full engine state into the fixed-layout blob.
    fn write_state(&self) -> Vec<u8>;

    /// Replace the engine state with a blob produced by [`Self::write_state`].
    ///
    /// # Errors
    /// Fails fast on a blob of the wrong length, an unknown version or
    /// out-of-range fields. The engine is left untouched on error.
    fn read_state(&mut self, blob: &[u8]) -> Result<(), RngError>;

    /// Next full 32-bit word.
    fn next_u32(&mut self) -> u32 {
        self.next_bits(32)
    }
}
