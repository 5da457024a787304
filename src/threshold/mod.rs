//! Percentile threshold estimation.
//!
//! - [`percentile`]: linear-interpolation percentiles.
//! - [`sampling`]: seeded subset draws and reservoir sampling.
//! - [`pairwise`]: parallel all-pairs distances of one subset.
//! - [`estimator`]: repeats, averaging and the threshold order policy.
//! - [`record`]: the `{"p0.5", "p40"}` JSON record.

pub mod estimator;
pub mod pairwise;
pub mod percentile;
pub mod record;
pub mod sampling;

pub use estimator::{ThresholdEstimate, ThresholdEstimator, ThresholdOrderPolicy, ThresholdParams};
pub use pairwise::{canonical_pairs, pairwise_distances};
pub use percentile::{percentile_sorted, percentiles};
pub use record::{load_thresholds, save_thresholds};
pub use sampling::{sample_indices, subset_rng, Reservoir};
