//! Weighted categorical selection
//!
//! Turns non-negative weights into a cumulative distribution and maps a
//! uniform draw in `[0, 1]` onto an index. Draws come from the caller, so this
//! module has no dependency on any engine.

mod weighted;

pub use weighted::{
    organize_distribution, pick_from_distribution, pick_from_distribution_with_threshold,
    CumulativeDistribution, DistributionError, DEFAULT_LINEAR_THRESHOLD,
};
