//! MT Sampler Core - Deterministic Random Engine
//!
//! Seedable, bit-reproducible MT19937 engine plus weighted categorical
//! selection, for simulations whose runs must repeat exactly.
//!
//! # Architecture
//!
//! - **rng**: Core engine, distribution layer, shared engine, state blob
//! - **sampling**: Cumulative distributions and weighted index picking
//! - **stream**: Stream configuration and JSON checkpoints
//!
//! # Critical Invariants
//!
//! 1. Same seed + same call sequence = same draws
//! 2. Restored state continues bit-identically
//! 3. Zero-weight entries are never picked
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod rng;
pub mod sampling;
pub mod stream;

// Re-exports for convenience
pub use rng::{
    Distributions, MersenneTwister, RandomEngine, RngError, SharedMersenneTwister,
};
pub use sampling::{
    organize_distribution, pick_from_distribution, CumulativeDistribution, DistributionError,
};
pub use stream::{SeedConfig, StreamCheckpoint, StreamConfig, StreamError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn mt_sampler_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::engine::PyMersenneTwister>()?;
    m.add_function(wrap_pyfunction!(ffi::sampling::organize_distribution, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::sampling::pick_from_distribution, m)?)?;
    Ok(())
}
