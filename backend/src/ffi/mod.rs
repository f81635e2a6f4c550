//! Python bindings (feature `pyo3`)
//!
//! Minimal surface: the exclusive engine and the weighted-selection functions.

pub mod engine;
pub mod sampling;
pub mod types;
