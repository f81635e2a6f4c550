//! Type conversion utilities for FFI boundary
//!
//! Converts Python dicts into stream configs and Rust errors into Python
//! exceptions.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::rng::RngError;
use crate::sampling::{DistributionError, DEFAULT_LINEAR_THRESHOLD};
use crate::stream::{SeedConfig, StreamConfig, StreamError};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with clear error messages.
///
/// # Errors
/// Returns PyValueError if the field is missing or has the wrong type.
fn extract_required<'py, T: FromPyObject<'py>>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T> {
    dict.get_item(key)?
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Missing required field '{}'", key))
        })?
        .extract()
}

/// Extract a field, falling back to `default` when it is absent.
fn extract_with_default<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
    default: T,
) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Convert a Python config dict into a [`StreamConfig`]
///
/// ```python
/// {"seed": {"type": "Scalar", "value": 42}, "pick_linear_threshold": 8}
/// {"seed": {"type": "Array", "values": [1, 2, 3]}}
/// {"seed": {"type": "Time"}}
/// ```
pub fn parse_stream_config(py_config: &Bound<'_, PyDict>) -> PyResult<StreamConfig> {
    let seed_any = py_config
        .get_item("seed")?
        .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyValueError, _>("Missing required field 'seed'"))?;
    let seed_dict = seed_any.downcast::<PyDict>()?;

    let seed_type: String = extract_required(seed_dict, "type")?;
    let seed = match seed_type.as_str() {
        "Scalar" => SeedConfig::Scalar {
            value: extract_required(seed_dict, "value")?,
        },
        "Array" => SeedConfig::Array {
            values: extract_required(seed_dict, "values")?,
        },
        "Time" => SeedConfig::Time,
        other => {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Unknown seed type: {}",
                other
            )))
        }
    };

    Ok(StreamConfig {
        seed,
        pick_linear_threshold: extract_with_default(
            py_config,
            "pick_linear_threshold",
            DEFAULT_LINEAR_THRESHOLD,
        )?,
    })
}

// ========================================================================
// Error Conversion
// ========================================================================

pub fn rng_error_to_py(err: RngError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
}

pub fn distribution_error_to_py(err: DistributionError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
}

pub fn stream_error_to_py(err: StreamError) -> PyErr {
    match err {
        StreamError::Rng(inner) => rng_error_to_py(inner),
        other => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(other.to_string()),
    }
}
