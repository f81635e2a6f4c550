//! Weighted selection tests
//!
//! Critical invariants tested:
//! - Cumulative form is non-decreasing and ends at exactly 1.0
//! - Zero-weight entries are never picked
//! - Linear scan and binary search agree

use mt_sampler_core::rng::{Distributions, MersenneTwister};
use mt_sampler_core::sampling::{
    organize_distribution, pick_from_distribution, pick_from_distribution_with_threshold,
    CumulativeDistribution, DistributionError,
};
use proptest::prelude::*;

// ============================================================================
// Organizing
// ============================================================================

#[test]
fn test_interleaved_zero_weights_layout() {
    let mut weights = vec![0.0, 0.5, 0.0, 0.5];
    organize_distribution(&mut weights, false).unwrap();
    assert_eq!(weights, vec![0.0, 0.5, 0.5, 1.0]);
}

#[test]
fn test_negative_weight_rejected() {
    let mut weights = vec![-1.0, 2.0];
    assert_eq!(
        organize_distribution(&mut weights, false),
        Err(DistributionError::NegativeWeight {
            index: 0,
            weight: -1.0
        })
    );
}

#[test]
fn test_all_zero_rejected_unless_allowed() {
    let mut weights = vec![0.0, 0.0];
    assert_eq!(
        organize_distribution(&mut weights, false),
        Err(DistributionError::AllZeroWeights)
    );

    organize_distribution(&mut weights, true).unwrap();
    assert_eq!(weights, vec![0.5, 1.0]);
}

#[test]
fn test_negative_weight_rejected_even_when_zeros_allowed() {
    let mut weights = vec![0.0, -0.5];
    assert!(matches!(
        organize_distribution(&mut weights, true),
        Err(DistributionError::NegativeWeight { index: 1, .. })
    ));
}

// ============================================================================
// Picking
// ============================================================================

#[test]
fn test_interleaved_zero_weights_never_picked() {
    let mut weights = vec![0.0, 0.5, 0.0, 0.5];
    organize_distribution(&mut weights, false).unwrap();

    for draw in [0.0, 0.1, 0.4999, 0.5, 0.5001, 0.9, 1.0] {
        let picked = pick_from_distribution(&weights, draw).unwrap();
        assert!(picked == 1 || picked == 3, "draw {} picked {}", draw, picked);
    }

    let mut rng = MersenneTwister::new(1);
    for _ in 0..10_000 {
        let picked = pick_from_distribution(&weights, rng.next_double_in(true, true)).unwrap();
        assert!(picked == 1 || picked == 3);
    }
}

#[test]
fn test_uniform_quarters_boundary() {
    let mut weights = vec![1.0, 1.0, 1.0, 1.0];
    organize_distribution(&mut weights, false).unwrap();

    assert_eq!(pick_from_distribution(&weights, 0.26), Ok(1));
    assert_eq!(pick_from_distribution(&weights, 0.25), Ok(1));
    assert_eq!(pick_from_distribution(&weights, 0.2499), Ok(0));
    assert_eq!(pick_from_distribution(&weights, 1.0), Ok(3));
}

#[test]
fn test_trailing_zero_weight_never_picked() {
    let dist = CumulativeDistribution::from_weights(vec![1.0, 3.0, 0.0, 0.0], false).unwrap();
    assert_eq!(dist.pick(1.0), Ok(1));
    assert_eq!(dist.pick(0.9999), Ok(1));
}

#[test]
fn test_leading_zero_weight_never_picked() {
    let dist = CumulativeDistribution::from_weights(vec![0.0, 0.0, 1.0, 1.0], false).unwrap();
    assert_eq!(dist.pick(0.0), Ok(2));
}

#[test]
fn test_pick_rejects_out_of_range_draws() {
    let weights = [0.5, 1.0];
    assert_eq!(
        pick_from_distribution(&weights, 1.01),
        Err(DistributionError::InvalidProbability(1.01))
    );
    assert!(pick_from_distribution(&weights, -1e-9).is_err());
}

#[test]
fn test_weighted_frequencies_follow_weights() {
    let dist = CumulativeDistribution::from_weights(vec![10.0, 1.0], false).unwrap();
    let mut rng = MersenneTwister::new(42);

    let mut counts = [0usize; 2];
    for _ in 0..11_000 {
        counts[dist.pick(rng.next_double()).unwrap()] += 1;
    }
    // Expect ~10000 vs ~1000
    assert!(counts[0] > 9_500 && counts[0] < 10_500, "counts {:?}", counts);
}

#[test]
fn test_binary_search_large_distribution() {
    let weights: Vec<f64> = (0..100).map(|i| if i % 3 == 0 { 0.0 } else { 1.0 }).collect();
    let dist = CumulativeDistribution::from_weights(weights.clone(), false).unwrap();

    let mut rng = MersenneTwister::new(7);
    for _ in 0..10_000 {
        let picked = dist.pick(rng.next_double()).unwrap();
        assert!(weights[picked] > 0.0, "picked zero-weight slot {}", picked);
    }
}

#[test]
fn test_huge_equal_weights_stay_equal() {
    let dist = CumulativeDistribution::from_weights(vec![f64::MAX, f64::MAX], false).unwrap();
    assert_eq!(dist.as_slice(), &[0.5, 1.0]);

    let mut rng = MersenneTwister::new(1000);
    let mut counts = [0usize; 2];
    for _ in 0..1000 {
        counts[dist.pick(rng.next_double()).unwrap()] += 1;
    }
    assert!(counts[0] > 400 && counts[1] > 400, "counts {:?}", counts);
}

// ============================================================================
// Properties
// ============================================================================

fn weights_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![Just(0.0), (1u32..=20).prop_map(|w| w as f64)],
        1..40,
    )
    .prop_filter("at least one positive weight", |w| w.iter().any(|&x| x > 0.0))
}

/// Weights spanning the whole finite range, including sums that overflow
fn wide_weights_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            Just(0.0),
            Just(f64::MIN_POSITIVE),
            Just(f64::MAX),
            (1e-300f64..1e-250),
            (1e250f64..1e300),
            (0.0f64..1e6),
        ],
        1..40,
    )
    .prop_filter("at least one positive weight", |w| w.iter().any(|&x| x > 0.0))
}

fn assert_valid_cumulative(cumulative: &[f64]) -> Result<(), TestCaseError> {
    prop_assert_eq!(*cumulative.last().unwrap(), 1.0);
    prop_assert!(cumulative.iter().all(|&c| (0.0..=1.0).contains(&c)));
    prop_assert!(
        cumulative.windows(2).all(|w| w[0] <= w[1]),
        "not non-decreasing: {:?}",
        cumulative
    );
    Ok(())
}

proptest! {
    #[test]
    fn prop_organized_distribution_is_valid(weights in weights_strategy()) {
        let mut cumulative = weights.clone();
        organize_distribution(&mut cumulative, false).unwrap();
        assert_valid_cumulative(&cumulative)?;
    }

    #[test]
    fn prop_wide_magnitudes_organize_validly(weights in wide_weights_strategy()) {
        let mut cumulative = weights.clone();
        organize_distribution(&mut cumulative, false).unwrap();
        assert_valid_cumulative(&cumulative)?;
    }

    #[test]
    fn prop_zero_weights_never_picked(weights in weights_strategy(), draw in 0.0f64..=1.0) {
        let mut cumulative = weights.clone();
        organize_distribution(&mut cumulative, false).unwrap();
        let picked = pick_from_distribution(&cumulative, draw).unwrap();
        prop_assert!(weights[picked] > 0.0, "picked zero-weight slot {} for draw {}", picked, draw);
    }

    #[test]
    fn prop_linear_and_binary_search_agree(weights in weights_strategy(), draw in 0.0f64..=1.0) {
        let mut cumulative = weights.clone();
        organize_distribution(&mut cumulative, false).unwrap();
        let linear = pick_from_distribution_with_threshold(&cumulative, draw, usize::MAX).unwrap();
        let binary = pick_from_distribution_with_threshold(&cumulative, draw, 0).unwrap();
        prop_assert_eq!(linear, binary);
    }
}
