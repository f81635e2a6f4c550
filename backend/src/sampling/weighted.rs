//! Cumulative distributions over non-negative weights
//!
//! # Critical Invariants
//!
//! - An organized distribution is non-decreasing and ends exactly at `1.0`
//! - A zero-weight entry is never picked (unless every weight was zero and
//!   the caller opted into the uniform fallback)
//! - Ties land on the first slot of an equal-value plateau

use thiserror::Error;

/// Below this many slots the picker scans linearly instead of bisecting
pub const DEFAULT_LINEAR_THRESHOLD: usize = 8;

/// Errors raised while organizing or picking from a distribution
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DistributionError {
    #[error("Distribution has no elements")]
    EmptyDistribution,

    #[error("Negative weight {weight} at index {index}")]
    NegativeWeight { index: usize, weight: f64 },

    #[error("Non-finite weight {weight} at index {index}")]
    NonFiniteWeight { index: usize, weight: f64 },

    #[error("All weights are zero")]
    AllZeroWeights,

    #[error("Draw {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// Turn `weights` in place into a cumulative distribution
///
/// Weights are normalized by their sum and prefix-summed. The trailing run of
/// slots equal to their predecessor (zero weights at the end) and the last
/// distinct slot are then forced to exactly `1.0`, so rounding can never leave
/// the final slot unreachable.
///
/// # Errors
/// - [`DistributionError::EmptyDistribution`] if `weights` is empty
/// - [`DistributionError::NegativeWeight`] if any weight is below zero
/// - [`DistributionError::NonFiniteWeight`] for NaN or infinite weights
/// - [`DistributionError::AllZeroWeights`] if the weights sum to zero and
///   `allow_all_zeros` is false; with it set, every weight counts as 1
///
/// `weights` is left unmodified on error.
///
/// # Example
/// ```
/// use mt_sampler_core::sampling::organize_distribution;
///
/// let mut weights = vec![1.0, 1.0, 2.0];
/// organize_distribution(&mut weights, false).unwrap();
/// assert_eq!(weights, vec![0.25, 0.5, 1.0]);
/// ```
pub fn organize_distribution(
    weights: &mut [f64],
    allow_all_zeros: bool,
) -> Result<(), DistributionError> {
    if weights.is_empty() {
        return Err(DistributionError::EmptyDistribution);
    }

    let mut sum = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() {
            return Err(DistributionError::NonFiniteWeight { index, weight });
        }
        if weight < 0.0 {
            return Err(DistributionError::NegativeWeight { index, weight });
        }
        sum += weight;
    }

    // Finite weights can still overflow the sum; scale by the largest first
    if sum.is_infinite() {
        let largest = weights.iter().copied().fold(0.0, f64::max);
        weights.iter_mut().for_each(|w| *w /= largest);
        sum = weights.iter().sum();
    }

    if sum == 0.0 {
        if !allow_all_zeros {
            return Err(DistributionError::AllZeroWeights);
        }
        weights.iter_mut().for_each(|w| *w = 1.0);
        sum = weights.len() as f64;
    }

    for w in weights.iter_mut() {
        *w /= sum;
    }

    for i in 1..weights.len() {
        weights[i] += weights[i - 1];
    }

    let mut last = weights.len() - 1;
    while last > 0 && weights[last] == weights[last - 1] {
        weights[last] = 1.0;
        last -= 1;
    }
    weights[last] = 1.0;

    Ok(())
}

/// Map a uniform draw onto an index of an organized distribution
///
/// Uses [`DEFAULT_LINEAR_THRESHOLD`]. See
/// [`pick_from_distribution_with_threshold`].
pub fn pick_from_distribution(cumulative: &[f64], draw: f64) -> Result<usize, DistributionError> {
    pick_from_distribution_with_threshold(cumulative, draw, DEFAULT_LINEAR_THRESHOLD)
}

/// Map a uniform draw onto an index, choosing the search strategy by size
///
/// Returns the first slot whose cumulative value exceeds `draw` (the last
/// slot if none does), then applies zero exemption. Distributions shorter
/// than `linear_threshold` are scanned linearly, longer ones bisected; both
/// strategies land on the same index.
///
/// # Errors
/// - [`DistributionError::InvalidProbability`] if `draw` is outside `[0, 1]`
/// - [`DistributionError::EmptyDistribution`] if `cumulative` is empty
pub fn pick_from_distribution_with_threshold(
    cumulative: &[f64],
    draw: f64,
    linear_threshold: usize,
) -> Result<usize, DistributionError> {
    if !(0.0..=1.0).contains(&draw) {
        return Err(DistributionError::InvalidProbability(draw));
    }
    if cumulative.is_empty() {
        return Err(DistributionError::EmptyDistribution);
    }

    let last = cumulative.len() - 1;
    if last == 0 {
        return Ok(0);
    }

    if cumulative.len() < linear_threshold {
        let landing = cumulative[..last]
            .iter()
            .position(|&c| c > draw)
            .unwrap_or(last);
        return Ok(exempt_zeros(cumulative, landing));
    }

    let mut bottom = 0;
    let mut top = last;
    while top != bottom {
        let cur = (top + bottom) / 2;
        if cumulative[cur] > draw {
            if cur == 0 || cumulative[cur - 1] <= draw {
                return Ok(exempt_zeros(cumulative, cur));
            }
            top = cur;
        } else if cur == last {
            return Ok(exempt_zeros(cumulative, cur));
        } else if bottom == cur {
            // (8 + 9) / 2 == 8: step past the floor
            bottom += 1;
        } else {
            bottom = cur;
        }
    }
    Ok(exempt_zeros(cumulative, bottom))
}

/// Move a landing index off zero-weight slots
///
/// A slot still at 0.0 sits in the leading zero run and moves forward to the
/// first non-zero slot; any other slot moves back to the start of its plateau.
fn exempt_zeros(cumulative: &[f64], mut index: usize) -> usize {
    if cumulative[index] == 0.0 {
        while index < cumulative.len() - 1 && cumulative[index] == 0.0 {
            index += 1;
        }
    } else {
        while index > 0 && cumulative[index] == cumulative[index - 1] {
            index -= 1;
        }
    }
    index
}

/// Owned, already-organized cumulative distribution
///
/// # Example
/// ```
/// use mt_sampler_core::rng::{Distributions, MersenneTwister};
/// use mt_sampler_core::sampling::CumulativeDistribution;
///
/// let dist = CumulativeDistribution::from_weights(vec![0.0, 3.0, 1.0], false).unwrap();
/// let mut rng = MersenneTwister::new(7);
/// let picked = dist.pick(rng.next_double()).unwrap();
/// assert_ne!(picked, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeDistribution {
    cumulative: Vec<f64>,
}

impl CumulativeDistribution {
    /// Organize `weights` into a cumulative distribution
    pub fn from_weights(mut weights: Vec<f64>, allow_all_zeros: bool) -> Result<Self, DistributionError> {
        organize_distribution(&mut weights, allow_all_zeros)?;
        Ok(Self { cumulative: weights })
    }

    /// Organize the weights that `weight_of` reads from each item
    ///
    /// Indices returned by [`Self::pick`] index into `items`.
    pub fn from_items<T>(
        items: &[T],
        weight_of: impl Fn(&T) -> f64,
        allow_all_zeros: bool,
    ) -> Result<Self, DistributionError> {
        Self::from_weights(items.iter().map(weight_of).collect(), allow_all_zeros)
    }

    pub fn pick(&self, draw: f64) -> Result<usize, DistributionError> {
        pick_from_distribution(&self.cumulative, draw)
    }

    pub fn pick_with_threshold(&self, draw: f64, linear_threshold: usize) -> Result<usize, DistributionError> {
        pick_from_distribution_with_threshold(&self.cumulative, draw, linear_threshold)
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Always false: construction rejects empty weight lists
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cumulative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organize_rejects_empty() {
        let mut weights: Vec<f64> = vec![];
        assert_eq!(
            organize_distribution(&mut weights, true),
            Err(DistributionError::EmptyDistribution)
        );
    }

    #[test]
    fn test_organize_survives_overflowing_sum() {
        let mut weights = vec![f64::MAX, f64::MAX];
        organize_distribution(&mut weights, false).unwrap();
        assert_eq!(weights, vec![0.5, 1.0]);

        let mut weights = vec![f64::MAX, 0.0, f64::MAX / 2.0];
        organize_distribution(&mut weights, false).unwrap();
        assert!((weights[0] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(weights[1], weights[0]);
        assert_eq!(weights[2], 1.0);
    }

    #[test]
    fn test_organize_rejects_nan() {
        let mut weights = vec![1.0, f64::NAN];
        assert!(matches!(
            organize_distribution(&mut weights, false),
            Err(DistributionError::NonFiniteWeight { index: 1, .. })
        ));
    }

    #[test]
    fn test_organize_leaves_weights_untouched_on_error() {
        let mut weights = vec![2.0, -1.0];
        assert!(organize_distribution(&mut weights, false).is_err());
        assert_eq!(weights, vec![2.0, -1.0]);
    }

    #[test]
    fn test_trailing_zero_run_forced_to_one() {
        let mut weights = vec![1.0, 1.0, 0.0, 0.0];
        organize_distribution(&mut weights, false).unwrap();
        assert_eq!(weights, vec![0.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rounding_cannot_strand_last_slot() {
        let mut weights = vec![0.1; 10];
        organize_distribution(&mut weights, false).unwrap();
        assert_eq!(*weights.last().unwrap(), 1.0);
    }

    #[test]
    fn test_pick_single_slot() {
        assert_eq!(pick_from_distribution(&[1.0], 0.7), Ok(0));
    }

    #[test]
    fn test_pick_rejects_bad_draw() {
        let cumulative = [0.5, 1.0];
        assert_eq!(
            pick_from_distribution(&cumulative, 1.5),
            Err(DistributionError::InvalidProbability(1.5))
        );
        assert!(pick_from_distribution(&cumulative, -0.1).is_err());
        assert!(pick_from_distribution(&cumulative, f64::NAN).is_err());
    }

    #[test]
    fn test_exempt_zeros_moves_forward_from_leading_zeros() {
        assert_eq!(exempt_zeros(&[0.0, 0.0, 0.5, 1.0], 0), 2);
    }

    #[test]
    fn test_exempt_zeros_moves_back_to_plateau_start() {
        assert_eq!(exempt_zeros(&[0.25, 0.5, 0.5, 0.5, 1.0], 3), 1);
        assert_eq!(exempt_zeros(&[0.25, 0.5, 0.75, 1.0], 2), 2);
    }

    #[test]
    fn test_binary_search_on_long_distribution() {
        let mut weights = vec![1.0; 16];
        organize_distribution(&mut weights, false).unwrap();
        // Each slot covers 1/16
        assert_eq!(pick_from_distribution(&weights, 0.0), Ok(0));
        assert_eq!(pick_from_distribution(&weights, 0.5), Ok(8));
        assert_eq!(pick_from_distribution(&weights, 0.99), Ok(15));
        assert_eq!(pick_from_distribution(&weights, 1.0), Ok(15));
    }

    #[test]
    fn test_from_items_reads_weights() {
        struct Candidate {
            fitness: f64,
        }
        let items = [
            Candidate { fitness: 0.0 },
            Candidate { fitness: 2.0 },
            Candidate { fitness: 2.0 },
        ];
        let dist = CumulativeDistribution::from_items(&items, |c| c.fitness, false).unwrap();
        assert_eq!(dist.as_slice(), &[0.0, 0.5, 1.0]);
        assert_eq!(dist.pick(0.0), Ok(1));
        assert_eq!(dist.pick(0.75), Ok(2));
        assert_eq!(dist.len(), 3);
    }
}
