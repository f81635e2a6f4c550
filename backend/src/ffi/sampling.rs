//! PyO3 wrappers for weighted selection

use pyo3::prelude::*;

use super::types::distribution_error_to_py;
use crate::sampling::{self, DEFAULT_LINEAR_THRESHOLD};

/// Return the cumulative form of `weights` (the input list is not mutated)
#[pyfunction]
#[pyo3(signature = (weights, allow_all_zeros = false))]
pub fn organize_distribution(mut weights: Vec<f64>, allow_all_zeros: bool) -> PyResult<Vec<f64>> {
    sampling::organize_distribution(&mut weights, allow_all_zeros).map_err(distribution_error_to_py)?;
    Ok(weights)
}

#[pyfunction]
#[pyo3(signature = (cumulative, draw, linear_threshold = DEFAULT_LINEAR_THRESHOLD))]
pub fn pick_from_distribution(cumulative: Vec<f64>, draw: f64, linear_threshold: usize) -> PyResult<usize> {
    sampling::pick_from_distribution_with_threshold(&cumulative, draw, linear_threshold)
        .map_err(distribution_error_to_py)
}
