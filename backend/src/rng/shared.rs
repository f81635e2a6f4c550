//! Mutex-guarded engine for streams drawn from several threads
//!
//! Wraps the same [`MersenneTwister`] used by exclusive owners. Every public
//! operation takes the lock exactly once, so a compound draw such as
//! `next_double` (two words) or `next_gaussian` (a whole polar trial loop) is a
//! single critical section and can never interleave with another thread's
//! draw. Lock hold time is O(1) amortized, O(624) when a block regenerates.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::distributions::Distributions;
use super::mersenne::MersenneTwister;
use super::RngError;

/// Thread-safe MT19937 engine
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use mt_sampler_core::rng::SharedMersenneTwister;
///
/// let rng = Arc::new(SharedMersenneTwister::new(12345));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let rng = Arc::clone(&rng);
///         std::thread::spawn(move || rng.next_double())
///     })
///     .collect();
/// for handle in handles {
///     let d = handle.join().unwrap();
///     assert!((0.0..1.0).contains(&d));
/// }
/// ```
#[derive(Debug, Default)]
pub struct SharedMersenneTwister {
    inner: Mutex<MersenneTwister>,
}

impl SharedMersenneTwister {
    /// Create a shared engine seeded from a scalar (low 32 bits significant)
    pub fn new(seed: i64) -> Self {
        Self::from_engine(MersenneTwister::new(seed))
    }

    /// Create a shared engine seeded from an array of words
    pub fn from_slice(key: &[i32]) -> Result<Self, RngError> {
        Ok(Self::from_engine(MersenneTwister::from_slice(key)?))
    }

    /// Move an exclusive engine behind the lock
    pub fn from_engine(engine: MersenneTwister) -> Self {
        Self {
            inner: Mutex::new(engine),
        }
    }

    /// Take the engine back out
    pub fn into_inner(self) -> MersenneTwister {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // No operation panics half-way through a state update, so a poisoned
    // lock still guards a consistent engine.
    fn lock(&self) -> MutexGuard<'_, MersenneTwister> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access, as one critical section
    ///
    /// Use this for sequences of draws that must not interleave with other
    /// threads (e.g. drawing a whole vector of values for one individual).
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut MersenneTwister) -> R) -> R {
        f(&mut self.lock())
    }

    /// Copy of the current engine, cache included
    pub fn snapshot(&self) -> MersenneTwister {
        self.lock().clone()
    }

    pub fn seed(&self, seed: i64) {
        self.lock().seed(seed)
    }

    pub fn seed_from_slice(&self, key: &[i32]) -> Result<(), RngError> {
        self.lock().seed_from_slice(key)
    }

    pub fn next_bits(&self, bits: u32) -> u32 {
        self.lock().next_bits(bits)
    }

    pub fn next_u32(&self) -> u32 {
        self.lock().next_u32()
    }

    pub fn next_u64(&self) -> u64 {
        self.lock().next_u64()
    }

    pub fn next_int(&self, n: i32) -> Result<i32, RngError> {
        self.lock().next_int(n)
    }

    pub fn next_long(&self, n: i64) -> Result<i64, RngError> {
        self.lock().next_long(n)
    }

    pub fn next_double(&self) -> f64 {
        self.lock().next_double()
    }

    pub fn next_double_in(&self, include_zero: bool, include_one: bool) -> f64 {
        self.lock().next_double_in(include_zero, include_one)
    }

    pub fn next_float(&self) -> f32 {
        self.lock().next_float()
    }

    pub fn next_float_in(&self, include_zero: bool, include_one: bool) -> f32 {
        self.lock().next_float_in(include_zero, include_one)
    }

    pub fn next_boolean(&self) -> bool {
        self.lock().next_boolean()
    }

    pub fn next_boolean_with(&self, p: f64) -> Result<bool, RngError> {
        self.lock().next_boolean_with(p)
    }

    pub fn next_gaussian(&self) -> f64 {
        self.lock().next_gaussian()
    }

    pub fn fill_bytes(&self, buf: &mut [u8]) {
        self.lock().fill_bytes(buf)
    }

    pub fn clear_gaussian_cache(&self) {
        self.lock().clear_gaussian_cache()
    }

    pub fn write_state(&self) -> Vec<u8> {
        self.lock().write_state()
    }

    pub fn read_state(&self, blob: &[u8]) -> Result<(), RngError> {
        self.lock().read_state(blob)
    }

    /// Compare generative state with another shared engine
    ///
    /// Comparing an engine with itself is trivially true and does not lock
    /// twice.
    pub fn state_equals(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let mine = self.snapshot();
        let theirs = other.lock();
        mine.state_equals(&theirs)
    }
}

impl From<MersenneTwister> for SharedMersenneTwister {
    fn from(engine: MersenneTwister) -> Self {
        Self::from_engine(engine)
    }
}
