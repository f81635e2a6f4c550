//! PyO3 wrapper for MersenneTwister
//!
//! # Example (from Python)
//!
//! ```python
//! from mt_sampler_core import MersenneTwister
//!
//! rng = MersenneTwister(12345)
//! roll = rng.next_int(6)
//! blob = rng.get_state()
//! again = MersenneTwister()
//! again.set_state(blob)
//! assert again.next_double() == rng.next_double()
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

use super::types::{parse_stream_config, rng_error_to_py, stream_error_to_py};
use crate::rng::{Distributions, MersenneTwister, DEFAULT_SEED};

/// Python wrapper for the exclusive-owner engine
///
/// Python objects are shared freely between threads, but PyO3 borrow
/// checking rejects concurrent `&mut` access, so no extra lock is needed.
#[pyclass(name = "MersenneTwister")]
pub struct PyMersenneTwister {
    inner: MersenneTwister,
}

#[pymethods]
impl PyMersenneTwister {
    #[new]
    #[pyo3(signature = (seed = DEFAULT_SEED))]
    fn new(seed: i64) -> Self {
        PyMersenneTwister {
            inner: MersenneTwister::new(seed),
        }
    }

    /// Create an engine seeded from a non-empty list of ints
    #[staticmethod]
    fn from_array(key: Vec<i32>) -> PyResult<Self> {
        let inner = MersenneTwister::from_slice(&key).map_err(rng_error_to_py)?;
        Ok(PyMersenneTwister { inner })
    }

    /// Create an engine from a stream config dict
    #[staticmethod]
    fn from_config(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let stream = parse_stream_config(config)?;
        let inner = stream.build().map_err(stream_error_to_py)?;
        Ok(PyMersenneTwister { inner })
    }

    fn seed(&mut self, seed: i64) {
        self.inner.seed(seed);
    }

    fn seed_array(&mut self, key: Vec<i32>) -> PyResult<()> {
        self.inner.seed_from_slice(&key).map_err(rng_error_to_py)
    }

    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_int(&mut self, n: i32) -> PyResult<i32> {
        self.inner.next_int(n).map_err(rng_error_to_py)
    }

    fn next_long(&mut self, n: i64) -> PyResult<i64> {
        self.inner.next_long(n).map_err(rng_error_to_py)
    }

    #[pyo3(signature = (include_zero = true, include_one = false))]
    fn next_double(&mut self, include_zero: bool, include_one: bool) -> f64 {
        self.inner.next_double_in(include_zero, include_one)
    }

    #[pyo3(signature = (include_zero = true, include_one = false))]
    fn next_float(&mut self, include_zero: bool, include_one: bool) -> f32 {
        self.inner.next_float_in(include_zero, include_one)
    }

    #[pyo3(signature = (probability = None))]
    fn next_boolean(&mut self, probability: Option<f64>) -> PyResult<bool> {
        match probability {
            Some(p) => self.inner.next_boolean_with(p).map_err(rng_error_to_py),
            None => Ok(self.inner.next_boolean()),
        }
    }

    fn next_gaussian(&mut self) -> f64 {
        self.inner.next_gaussian()
    }

    fn next_bytes<'py>(&mut self, py: Python<'py>, length: usize) -> Bound<'py, PyBytes> {
        let mut buf = vec![0u8; length];
        self.inner.fill_bytes(&mut buf);
        PyBytes::new_bound(py, &buf)
    }

    fn clear_gaussian_cache(&mut self) {
        self.inner.clear_gaussian_cache();
    }

    /// Fixed-layout state blob (see the Rust `rng::state` docs)
    fn get_state<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new_bound(py, &self.inner.write_state())
    }

    fn set_state(&mut self, blob: &[u8]) -> PyResult<()> {
        self.inner.read_state(blob).map_err(rng_error_to_py)
    }

    fn state_equals(&self, other: PyRef<'_, PyMersenneTwister>) -> bool {
        self.inner.state_equals(&other.inner)
    }

    fn __repr__(&self) -> String {
        format!("MersenneTwister(index={})", self.inner.index())
    }
}
