//! All-pairs distances over a sampled subset.
use crate::distance::{object_distance, DistanceParams, DtwWorkspace};
use crate::error::EvalResult;
use crate::types::MotionObject;
use rayon::prelude::*;

/// Canonical unordered pairs `(i, j)` with `i < j` over `0..n`.
pub fn canonical_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Distances of every canonical pair of `objects`, in pair order.
///
/// Pairs are evaluated in parallel; each worker keeps its own DTW buffers.
pub fn pairwise_distances(
    objects: &[&MotionObject],
    params: &DistanceParams,
) -> EvalResult<Vec<f64>> {
    canonical_pairs(objects.len())
        .par_iter()
        .map_init(DtwWorkspace::default, |ws, &(i, j)| {
            object_distance(&objects[i].payload, &objects[j].payload, params, ws)
        })
        .collect()
}
