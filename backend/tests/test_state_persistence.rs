//! State blob round-trips and state equality
//!
//! Critical invariants tested:
//! - Restored engines continue bit-identically
//! - Malformed blobs fail fast and leave the engine untouched
//! - `state_equals` ignores the Gaussian cache

use mt_sampler_core::rng::{Distributions, MersenneTwister, RandomEngine, RngError, STATE_BLOB_LEN};

fn draw_trace(rng: &mut MersenneTwister, n: usize) -> Vec<u64> {
    (0..n)
        .flat_map(|_| {
            [
                rng.next_u32() as u64,
                rng.next_double().to_bits(),
                rng.next_gaussian().to_bits(),
            ]
        })
        .collect()
}

#[test]
fn test_round_trip_fresh_engine() {
    let mut original = MersenneTwister::new(4242);
    let blob = original.write_state();

    let mut restored = MersenneTwister::new(0);
    restored.read_state(&blob).unwrap();

    assert!(restored.state_equals(&original));
    assert_eq!(draw_trace(&mut original, 1000), draw_trace(&mut restored, 1000));
}

#[test]
fn test_round_trip_mid_block_with_pending_gaussian() {
    let mut original = MersenneTwister::new(77);
    for _ in 0..1234 {
        original.next_u32();
    }
    original.next_gaussian();
    assert!(original.has_cached_gaussian());

    let restored_blob = original.write_state();
    let mut restored = MersenneTwister::from_state(&restored_blob).unwrap();

    assert!(restored.has_cached_gaussian());
    assert_eq!(restored.index(), original.index());
    assert_eq!(draw_trace(&mut original, 500), draw_trace(&mut restored, 500));
}

#[test]
fn test_round_trip_through_trait_object() {
    let mut source = MersenneTwister::from_slice(&[1, 2, 3]).unwrap();
    source.next_u64();

    let engine: &dyn RandomEngine = &source;
    let blob = engine.write_state();
    assert_eq!(blob.len(), STATE_BLOB_LEN);

    let mut target = MersenneTwister::default();
    let target_dyn: &mut dyn RandomEngine = &mut target;
    target_dyn.read_state(&blob).unwrap();

    assert!(target.state_equals(&source));
}

#[test]
fn test_blob_is_stable_for_same_state() {
    let a = MersenneTwister::new(5);
    let b = MersenneTwister::new(5);
    assert_eq!(a.write_state(), b.write_state());
}

#[test]
fn test_wrong_length_fails_fast_and_leaves_engine_untouched() {
    let mut rng = MersenneTwister::new(9);
    rng.next_u32();
    let before = rng.clone();

    let mut blob = MersenneTwister::new(10).write_state();
    blob.truncate(100);

    let err = rng.read_state(&blob).unwrap_err();
    assert_eq!(
        err,
        RngError::MalformedState {
            expected: STATE_BLOB_LEN,
            actual: 100
        }
    );
    assert!(rng.state_equals(&before));
    assert_eq!(rng.next_u32(), before.clone().next_u32());
}

#[test]
fn test_empty_blob_rejected() {
    assert!(matches!(
        MersenneTwister::from_state(&[]),
        Err(RngError::MalformedState { actual: 0, .. })
    ));
}

#[test]
fn test_state_equals_ignores_gaussian_cache() {
    let mut with_cache = MersenneTwister::new(21);
    with_cache.next_gaussian();

    // Same words and index, but no pending deviate
    let mut without_cache = with_cache.clone();
    without_cache.clear_gaussian_cache();

    assert!(with_cache.state_equals(&without_cache));
    assert_ne!(
        with_cache.next_gaussian().to_bits(),
        without_cache.next_gaussian().to_bits(),
        "engines should diverge until both caches are cleared"
    );
}

#[test]
fn test_clearing_both_caches_restores_equivalence() {
    let mut a = MersenneTwister::new(22);
    a.next_gaussian();
    let mut b = a.clone();
    b.clear_gaussian_cache();

    a.clear_gaussian_cache();
    b.clear_gaussian_cache();
    assert_eq!(draw_trace(&mut a, 200), draw_trace(&mut b, 200));
}

#[test]
fn test_state_equals_detects_index_difference() {
    let a = MersenneTwister::new(23);
    let mut b = MersenneTwister::new(23);
    assert!(a.state_equals(&b));
    b.next_u32();
    assert!(!a.state_equals(&b));
}
