//! Deterministic random number generation
//!
//! Uses the MT19937 Mersenne Twister for bit-reproducible random streams.
//! CRITICAL: Same seed + same call sequence MUST produce the same draws,
//! across processes, machines and checkpoint/resume boundaries.
//!
//! # Layout
//!
//! - [`RandomEngine`]: capability trait (raw words, seeding, state I/O)
//! - [`MersenneTwister`]: exclusive-owner engine, no internal locking
//! - [`SharedMersenneTwister`]: the same engine behind a mutex
//! - [`Distributions`]: bounded ints, floats, booleans, Gaussians, bytes
//! - [`state`]: fixed-layout state blob
//!
//! The generator is NOT cryptographically secure.

mod distributions;
mod engine;
mod mersenne;
mod shared;
pub mod state;

pub use distributions::Distributions;
pub use engine::RandomEngine;
pub use mersenne::{MersenneTwister, DEFAULT_SEED};
pub use shared::SharedMersenneTwister;
pub use state::STATE_BLOB_LEN;

use thiserror::Error;

/// Errors raised by the engine and the distribution layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RngError {
    /// Out-of-range argument (bound <= 0, probability outside [0, 1])
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Array seeding requires at least one word
    #[error("Invalid seed: seed array must not be empty")]
    InvalidSeed,

    /// Persisted state blob has the wrong length
    #[error("Malformed state: expected {expected} bytes, got {actual}")]
    MalformedState { expected: usize, actual: usize },

    /// Persisted state blob carries an unknown layout version
    #[error("Unsupported state version: {0}")]
    UnsupportedStateVersion(u8),

    /// A decoded state field is out of range
    #[error("Invalid state field: {0}")]
    InvalidStateField(String),
}
