//! Checkpoint - Save/Load Stream State
//!
//! JSON checkpoints for pause/resume of a random stream. The binary blob in
//! [`crate::rng::state`] is the compact engine format; this is the
//! human-inspectable one, tied to the config it was taken with.
//!
//! # Critical Invariants
//!
//! - **Determinism**: A restored engine continues with bit-identical draws
//! - **Config Matching**: State can only be loaded with matching config
//! - **Integrity**: 624 words, index in `0..=624`, canonical twist constants

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{StreamConfig, StreamError};
use crate::rng::state::validate_fields;
use crate::rng::MersenneTwister;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete engine state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Twist state vector (624 words)
    pub words: Vec<u32>,

    /// Twist constants
    pub mag01: [u32; 2],

    /// Next unused word
    pub index: u32,

    /// Pending Gaussian deviate as raw IEEE-754 bits (exact through JSON)
    pub gaussian_cache_bits: Option<u64>,
}

impl From<&MersenneTwister> for EngineSnapshot {
    fn from(engine: &MersenneTwister) -> Self {
        let (words, mag01, index, gaussian_cache) = engine.raw_parts();
        EngineSnapshot {
            words: words.to_vec(),
            mag01,
            index: index as u32,
            gaussian_cache_bits: gaussian_cache.map(f64::to_bits),
        }
    }
}

impl TryFrom<EngineSnapshot> for MersenneTwister {
    type Error = StreamError;

    fn try_from(snapshot: EngineSnapshot) -> Result<Self, Self::Error> {
        validate_snapshot(&snapshot)?;
        let mut engine = MersenneTwister::default();
        engine.restore(crate::rng::state::DecodedState {
            words: snapshot
                .words
                .as_slice()
                .try_into()
                .map_err(|_| StreamError::StateValidationError("word count".to_string()))?,
            mag01: snapshot.mag01,
            index: snapshot.index as usize,
            gaussian_cache: snapshot.gaussian_cache_bits.map(f64::from_bits),
        });
        Ok(engine)
    }
}

/// A stream checkpoint: engine state plus the config it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCheckpoint {
    /// SHA256 hash of the stream config (for validation)
    pub config_hash: String,

    /// Draw operations performed before the checkpoint (caller bookkeeping)
    pub draws: u64,

    pub engine: EngineSnapshot,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Fingerprint a stream config for checkpoint matching
///
/// Covers `pick_linear_threshold` as well as the seed, so a checkpoint only
/// resumes under the exact settings it was taken with, including the cutoff
/// [`StreamConfig::pick_index`] hands to the picker. Keys are sorted before
/// hashing so field order in the source JSON never changes the digest.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, StreamError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        StreamError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        StreamError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation / Save / Load
// ============================================================================

/// Validate snapshot integrity
pub fn validate_snapshot(snapshot: &EngineSnapshot) -> Result<(), StreamError> {
    validate_fields(&snapshot.words, &snapshot.mag01, snapshot.index as usize)
        .map_err(|e| StreamError::StateValidationError(e.to_string()))
}

/// Serialize `engine` into a checkpoint bound to `config`
pub fn save_checkpoint(
    config: &StreamConfig,
    engine: &MersenneTwister,
    draws: u64,
) -> Result<String, StreamError> {
    let checkpoint = StreamCheckpoint {
        config_hash: compute_config_hash(config)?,
        draws,
        engine: EngineSnapshot::from(engine),
    };

    validate_snapshot(&checkpoint.engine)?;

    serde_json::to_string(&checkpoint).map_err(|e| {
        StreamError::SerializationError(format!("Failed to serialize checkpoint: {}", e))
    })
}

/// Restore an engine from a checkpoint taken with the same `config`
///
/// # Errors
///
/// - `DeserializationError`: If JSON is invalid or corrupted
/// - `ConfigMismatch`: If config doesn't match checkpoint's config
/// - `StateValidationError`: If restored state violates invariants
pub fn load_checkpoint(
    config: &StreamConfig,
    checkpoint_json: &str,
) -> Result<(MersenneTwister, u64), StreamError> {
    let checkpoint: StreamCheckpoint = serde_json::from_str(checkpoint_json).map_err(|e| {
        StreamError::DeserializationError(format!("Failed to parse checkpoint JSON: {}", e))
    })?;

    let config_hash = compute_config_hash(config)?;
    if checkpoint.config_hash != config_hash {
        return Err(StreamError::ConfigMismatch {
            expected: checkpoint.config_hash,
            actual: config_hash,
        });
    }

    let engine = MersenneTwister::try_from(checkpoint.engine)?;
    tracing::debug!(draws = checkpoint.draws, "loaded stream checkpoint");
    Ok((engine, checkpoint.draws))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&StreamConfig::scalar(42)).unwrap();
        let hash2 = compute_config_hash(&StreamConfig::scalar(42)).unwrap();
        assert_eq!(hash1, hash2, "Same config should produce same hash");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let hash1 = compute_config_hash(&StreamConfig::scalar(42)).unwrap();
        let hash2 = compute_config_hash(&StreamConfig::scalar(43)).unwrap();
        assert_ne!(
            hash1, hash2,
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_snapshot_rejects_short_word_vector() {
        let mut snapshot = EngineSnapshot::from(&MersenneTwister::new(1));
        snapshot.words.pop();
        assert!(matches!(
            MersenneTwister::try_from(snapshot),
            Err(StreamError::StateValidationError(_))
        ));
    }

    #[test]
    fn test_snapshot_rejects_zero_state() {
        let mut snapshot = EngineSnapshot::from(&MersenneTwister::new(1));
        snapshot.words.iter_mut().for_each(|w| *w = 0);
        assert!(validate_snapshot(&snapshot).is_err());
    }
}
