//! Random stream configuration
//!
//! A stream is one logical sequence of draws: a seed plus the engine policy
//! chosen when it is built ([`StreamConfig::build`] for an exclusive owner,
//! [`StreamConfig::build_shared`] for the mutex-guarded engine).
//!
//! # Example
//! ```
//! use mt_sampler_core::stream::StreamConfig;
//!
//! let config = StreamConfig::from_json(r#"{"seed": {"type": "Scalar", "value": 42}}"#).unwrap();
//! let mut rng = config.build().unwrap();
//! let _ = rng.next_u32();
//! ```

pub mod checkpoint;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::{MersenneTwister, RngError, SharedMersenneTwister};
use crate::sampling::{pick_from_distribution_with_threshold, DistributionError, DEFAULT_LINEAR_THRESHOLD};

pub use checkpoint::{
    compute_config_hash, load_checkpoint, save_checkpoint, validate_snapshot, EngineSnapshot,
    StreamCheckpoint,
};

/// Errors raised while configuring, building or checkpointing a stream
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("RNG error: {0}")]
    Rng(#[from] RngError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Config mismatch: checkpoint was taken with config {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("State validation error: {0}")]
    StateValidationError(String),
}

/// How a stream is seeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeedConfig {
    /// One scalar; only the low 32 bits are significant
    Scalar { value: i64 },

    /// Array seeding, must be non-empty
    Array { values: Vec<i32> },

    /// Wall-clock milliseconds at build time (logged for reproduction)
    Time,
}

/// Configuration of one logical random stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub seed: SeedConfig,

    /// Linear-scan cutoff for weighted picks drawn from this stream
    #[serde(default = "default_linear_threshold")]
    pub pick_linear_threshold: usize,
}

fn default_linear_threshold() -> usize {
    DEFAULT_LINEAR_THRESHOLD
}

impl StreamConfig {
    pub fn scalar(seed: i64) -> Self {
        Self {
            seed: SeedConfig::Scalar { value: seed },
            pick_linear_threshold: DEFAULT_LINEAR_THRESHOLD,
        }
    }

    pub fn array(values: Vec<i32>) -> Self {
        Self {
            seed: SeedConfig::Array { values },
            pick_linear_threshold: DEFAULT_LINEAR_THRESHOLD,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StreamError> {
        serde_json::from_str(json).map_err(|e| {
            StreamError::DeserializationError(format!("Failed to parse stream config: {}", e))
        })
    }

    pub fn to_json(&self) -> Result<String, StreamError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            StreamError::SerializationError(format!("Failed to serialize stream config: {}", e))
        })
    }

    /// Build an exclusive-owner engine
    ///
    /// # Errors
    /// [`RngError::InvalidSeed`] for an empty seed array.
    pub fn build(&self) -> Result<MersenneTwister, StreamError> {
        let engine = match &self.seed {
            SeedConfig::Scalar { value } => MersenneTwister::new(*value),
            SeedConfig::Array { values } => MersenneTwister::from_slice(values)?,
            SeedConfig::Time => MersenneTwister::new(resolve_time_seed()),
        };
        Ok(engine)
    }

    /// Map `draw` onto an index of `cumulative` with this stream's
    /// linear-scan cutoff
    ///
    /// # Errors
    /// Same as [`pick_from_distribution_with_threshold`].
    pub fn pick_index(&self, cumulative: &[f64], draw: f64) -> Result<usize, DistributionError> {
        pick_from_distribution_with_threshold(cumulative, draw, self.pick_linear_threshold)
    }

    /// Build a mutex-guarded engine for a stream shared between threads
    pub fn build_shared(&self) -> Result<SharedMersenneTwister, StreamError> {
        Ok(SharedMersenneTwister::from_engine(self.build()?))
    }

    /// Build one exclusive engine per worker, each on a distinct seed
    ///
    /// Worker `i` of a scalar seed `s` gets `s + i`; an array seed gets `i`
    /// appended. A time seed is resolved once and then treated as a scalar.
    pub fn build_worker_engines(&self, count: usize) -> Result<Vec<MersenneTwister>, StreamError> {
        let time_base = match self.seed {
            SeedConfig::Time => resolve_time_seed(),
            _ => 0,
        };

        let engines = (0..count)
            .map(|worker| match &self.seed {
                SeedConfig::Scalar { value } => {
                    Ok(MersenneTwister::new(value.wrapping_add(worker as i64)))
                }
                SeedConfig::Array { values } => {
                    let mut key = values.clone();
                    key.push(worker as i32);
                    MersenneTwister::from_slice(&key)
                }
                SeedConfig::Time => Ok(MersenneTwister::new(time_base.wrapping_add(worker as i64))),
            })
            .collect::<Result<Vec<_>, RngError>>()?;

        tracing::debug!(count, "built worker engines");
        Ok(engines)
    }
}

/// Current wall-clock time in milliseconds, truncated to the significant
/// 32 bits a scalar seed keeps
fn resolve_time_seed() -> i64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    let seed = millis as u32 as i64;
    tracing::info!(seed, "resolved time-based seed");
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Distributions;

    #[test]
    fn test_config_json_round_trip() {
        let config = StreamConfig::array(vec![1, 2, 3]);
        let json = config.to_json().unwrap();
        assert_eq!(StreamConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_threshold_defaults_when_missing() {
        let config = StreamConfig::from_json(r#"{"seed": {"type": "Time"}}"#).unwrap();
        assert_eq!(config.pick_linear_threshold, DEFAULT_LINEAR_THRESHOLD);
        assert_eq!(config.seed, SeedConfig::Time);
    }

    #[test]
    fn test_unknown_seed_type_rejected() {
        let result = StreamConfig::from_json(r#"{"seed": {"type": "Entropy"}}"#);
        assert!(matches!(result, Err(StreamError::DeserializationError(_))));
    }

    #[test]
    fn test_pick_index_uses_configured_threshold() {
        // Not a valid cumulative form, so a linear scan and a bisection
        // land on different slots for the same draw
        let cumulative = [0.9, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 1.0];

        let mut config = StreamConfig::scalar(1);
        config.pick_linear_threshold = 9;
        assert_eq!(config.pick_index(&cumulative, 0.5), Ok(0));

        config.pick_linear_threshold = 8;
        assert_eq!(config.pick_index(&cumulative, 0.5), Ok(7));
    }

    #[test]
    fn test_empty_array_seed_fails_build() {
        let config = StreamConfig::array(vec![]);
        assert!(matches!(
            config.build(),
            Err(StreamError::Rng(RngError::InvalidSeed))
        ));
    }

    #[test]
    fn test_build_matches_direct_construction() {
        let mut built = StreamConfig::scalar(77).build().unwrap();
        let mut direct = MersenneTwister::new(77);
        assert_eq!(built.next_double(), direct.next_double());
    }

    #[test]
    fn test_worker_engines_use_offset_seeds() {
        let mut workers = StreamConfig::scalar(100).build_worker_engines(3).unwrap();
        assert_eq!(workers.len(), 3);
        for (i, worker) in workers.iter_mut().enumerate() {
            let mut expected = MersenneTwister::new(100 + i as i64);
            assert_eq!(worker.next_u32(), expected.next_u32());
        }
    }

    #[test]
    fn test_worker_engines_distinct_for_array_seed() {
        let mut workers = StreamConfig::array(vec![9, 9]).build_worker_engines(2).unwrap();
        let a = workers[0].next_u32();
        let b = workers[1].next_u32();
        assert_ne!(a, b);
    }
}
