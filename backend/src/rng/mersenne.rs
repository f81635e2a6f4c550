//! MT19937 Mersenne Twister
//!
//! 624-word state, period 2^19937 - 1. Words are handed out one at a time
//! after tempering; once the block is exhausted the whole vector is
//! regenerated by the twist recurrence.
//!
//! # Determinism
//!
//! Same seed → same sequence of words. This is CRITICAL for:
//! - Experiment repeatability
//! - Checkpoint/resume (see [`crate::rng::state`])
//! - Cross-machine comparisons of runs
//!
//! # Example
//! ```
//! use mt_sampler_core::rng::{Distributions, MersenneTwister};
//!
//! let mut rng = MersenneTwister::new(5489);
//! assert_eq!(rng.next_u32(), 3_499_211_612);
//!
//! let roll = rng.next_int(6).unwrap(); // [0, 6)
//! assert!((0..6).contains(&roll));
//! ```

use super::distributions::Distributions;
use super::engine::RandomEngine;
use super::state::{self, DecodedState};
use super::RngError;

/// Number of words in the state vector
pub(crate) const N: usize = 624;
/// Twist offset
const M: usize = 397;
/// Most significant bit of a word
pub(crate) const UPPER_MASK: u32 = 0x8000_0000;
/// Remaining 31 bits of a word
const LOWER_MASK: u32 = 0x7fff_ffff;
/// Twist constants, indexed by the low bit of the mixed word
pub(crate) const MAG01: [u32; 2] = [0x0, 0x9908_b0df];

const INIT_MULT: u32 = 1_812_433_253;
const ARRAY_MULT_A: u32 = 1_664_525;
const ARRAY_MULT_B: u32 = 1_566_083_941;
const ARRAY_BASE_SEED: i64 = 19_650_218;

const TEMPER_MASK_B: u32 = 0x9d2c_5680;
const TEMPER_MASK_C: u32 = 0xefc6_0000;

/// Seed used by the reference implementation when none is given
pub const DEFAULT_SEED: i64 = 5489;

/// Exclusive-owner MT19937 engine
///
/// No internal locking: one instance serves one logical stream owned by one
/// thread (e.g. one per worker of an evaluation pool). `&mut self` on every
/// draw makes that discipline a compile-time property. Use
/// [`crate::rng::SharedMersenneTwister`] when several threads must draw from
/// the same stream.
#[derive(Clone)]
pub struct MersenneTwister {
    /// Twist state vector
    words: [u32; N],

    /// Twist constants, persisted with the state
    mag01: [u32; 2],

    /// Next unused word; `N` means "regenerate before next read"
    index: usize,

    /// Second deviate of the last polar-method pair
    gaussian_cache: Option<f64>,
}

impl std::fmt::Debug for MersenneTwister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MersenneTwister")
            .field("index", &self.index)
            .field("head", &&self.words[..4])
            .field("gaussian_cache", &self.gaussian_cache)
            .finish()
    }
}

impl Default for MersenneTwister {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MersenneTwister {
    /// Create an engine seeded from a scalar
    ///
    /// Only the low 32 bits of `seed` are significant: `1` and `1 + 2^32`
    /// produce the same stream.
    ///
    /// # Example
    /// ```
    /// use mt_sampler_core::rng::MersenneTwister;
    ///
    /// let mut a = MersenneTwister::new(1);
    /// let mut b = MersenneTwister::new(1 + (1i64 << 32));
    /// assert_eq!(a.next_u32(), b.next_u32());
    /// ```
    pub fn new(seed: i64) -> Self {
        let mut rng = Self {
            words: [0; N],
            mag01: MAG01,
            index: N,
            gaussian_cache: None,
        };
        rng.seed(seed);
        rng
    }

    /// Create an engine seeded from an array of words
    ///
    /// # Errors
    /// [`RngError::InvalidSeed`] if `key` is empty.
    pub fn from_slice(key: &[i32]) -> Result<Self, RngError> {
        let mut rng = Self::new(ARRAY_BASE_SEED);
        rng.seed_from_slice(key)?;
        Ok(rng)
    }

    /// Reseed from a scalar (truncated to its low 32 bits)
    pub fn seed(&mut self, seed: i64) {
        self.init_words(seed as u32);
        tracing::debug!(seed, "seeded mersenne twister from scalar");
    }

    fn init_words(&mut self, seed: u32) {
        self.gaussian_cache = None;
        self.mag01 = MAG01;
        self.words[0] = seed;
        for i in 1..N {
            let prev = self.words[i - 1];
            self.words[i] = INIT_MULT
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.index = N;
    }

    /// Reseed from an array of words
    ///
    /// # Errors
    /// [`RngError::InvalidSeed`] if `key` is empty. The engine is untouched
    /// in that case.
    pub fn seed_from_slice(&mut self, key: &[i32]) -> Result<(), RngError> {
        if key.is_empty() {
            return Err(RngError::InvalidSeed);
        }

        self.init_words(ARRAY_BASE_SEED as u32);

        let mut i = 1usize;
        let mut j = 0usize;
        for _ in 0..N.max(key.len()) {
            let prev = self.words[i - 1];
            self.words[i] = (self.words[i] ^ (prev ^ (prev >> 30)).wrapping_mul(ARRAY_MULT_A))
                .wrapping_add(key[j] as u32)
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.words[0] = self.words[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            let prev = self.words[i - 1];
            self.words[i] = (self.words[i] ^ (prev ^ (prev >> 30)).wrapping_mul(ARRAY_MULT_B))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.words[0] = self.words[N - 1];
                i = 1;
            }
        }

        // Guarantees a non-zero state vector
        self.words[0] = UPPER_MASK;

        tracing::debug!(key_len = key.len(), "seeded mersenne twister from array");
        Ok(())
    }

    /// Regenerate the whole block of words (the "twist")
    fn regenerate_block(&mut self) {
        let mag01 = self.mag01;
        let mix = |upper: u32, lower: u32| {
            let y = (upper & UPPER_MASK) | (lower & LOWER_MASK);
            (y >> 1) ^ mag01[(y & 0x1) as usize]
        };

        for kk in 0..N - M {
            self.words[kk] = self.words[kk + M] ^ mix(self.words[kk], self.words[kk + 1]);
        }
        for kk in N - M..N - 1 {
            self.words[kk] = self.words[kk + M - N] ^ mix(self.words[kk], self.words[kk + 1]);
        }
        self.words[N - 1] = self.words[M - 1] ^ mix(self.words[N - 1], self.words[0]);

        self.index = 0;
        tracing::trace!("regenerated mersenne twister block");
    }

    fn temper(mut y: u32) -> u32 {
        y ^= y >> 11;
        y ^= (y << 7) & TEMPER_MASK_B;
        y ^= (y << 15) & TEMPER_MASK_C;
        y ^= y >> 18;
        y
    }

    /// Top `bits` bits (1..=32) of the next tempered word
    pub fn next_bits(&mut self, bits: u32) -> u32 {
        debug_assert!((1..=32).contains(&bits), "bits must be in 1..=32");
        if self.index >= N {
            self.regenerate_block();
        }
        let y = Self::temper(self.words[self.index]);
        self.index += 1;
        // Shifting a u32 by 32 overflows, so widen first
        ((y as u64) >> (32 - bits)) as u32
    }

    /// Next full 32-bit word
    pub fn next_u32(&mut self) -> u32 {
        self.next_bits(32)
    }

    /// Next 64-bit value: two consecutive words, the first in the high half
    pub fn next_u64(&mut self) -> u64 {
        Distributions::next_u64(self)
    }

    /// Fill `buf` with one draw per byte
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        Distributions::fill_bytes(self, buf)
    }

    /// Discard the pending Gaussian deviate
    ///
    /// Two engines with identical words can still diverge on the next
    /// `next_gaussian` if only one of them holds a cached deviate.
    pub fn clear_gaussian_cache(&mut self) {
        self.gaussian_cache = None;
    }

    /// Whether a second Gaussian deviate is pending
    pub fn has_cached_gaussian(&self) -> bool {
        self.gaussian_cache.is_some()
    }

    /// Next unused word position (0..=624)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw state vector
    pub fn words(&self) -> &[u32; N] {
        &self.words
    }

    /// True iff index, twist constants and every state word are equal
    ///
    /// The Gaussian cache is NOT compared; clear it on both sides when full
    /// behavioral equivalence is required.
    pub fn state_equals(&self, other: &Self) -> bool {
        self.index == other.index && self.mag01 == other.mag01 && self.words == other.words
    }

    /// Encode the engine into the fixed-layout blob (see [`crate::rng::state`])
    pub fn write_state(&self) -> Vec<u8> {
        state::encode(&self.words, &self.mag01, self.index, self.gaussian_cache)
    }

    /// Restore the engine from a blob produced by [`Self::write_state`]
    ///
    /// # Errors
    /// Fails fast on a wrong length, unknown version or out-of-range field;
    /// the engine is left untouched.
    pub fn read_state(&mut self, blob: &[u8]) -> Result<(), RngError> {
        let decoded = state::decode(blob)?;
        self.restore(decoded);
        tracing::debug!(index = self.index, "restored mersenne twister state");
        Ok(())
    }

    /// Build an engine directly from a blob
    pub fn from_state(blob: &[u8]) -> Result<Self, RngError> {
        let mut rng = Self::default();
        rng.read_state(blob)?;
        Ok(rng)
    }

    pub(crate) fn restore(&mut self, decoded: DecodedState) {
        self.words = decoded.words;
        self.mag01 = decoded.mag01;
        self.index = decoded.index;
        self.gaussian_cache = decoded.gaussian_cache;
    }

    pub(crate) fn raw_parts(&self) -> (&[u32; N], [u32; 2], usize, Option<f64>) {
        (&self.words, self.mag01, self.index, self.gaussian_cache)
    }
}

impl RandomEngine for MersenneTwister {
    fn next_bits(&mut self, bits: u32) -> u32 {
        MersenneTwister::next_bits(self, bits)
    }

    fn seed(&mut self, seed: i64) {
        MersenneTwister::seed(self, seed)
    }

    fn seed_from_slice(&mut self, key: &[i32]) -> Result<(), RngError> {
        MersenneTwister::seed_from_slice(self, key)
    }

    fn take_cached_gaussian(&mut self) -> Option<f64> {
        self.gaussian_cache.take()
    }

    fn cache_gaussian(&mut self, value: f64) {
        self.gaussian_cache = Some(value);
    }

    fn clear_gaussian_cache(&mut self) {
        MersenneTwister::clear_gaussian_cache(self)
    }

    fn write_state(&self) -> Vec<u8> {
        MersenneTwister::write_state(self)
    }

    fn read_state(&mut self, blob: &[u8]) -> Result<(), RngError> {
        MersenneTwister::read_state(self, blob)
    }
}

impl rand::RngCore for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        MersenneTwister::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        MersenneTwister::next_u64(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        MersenneTwister::fill_bytes(self, dst)
    }
}
