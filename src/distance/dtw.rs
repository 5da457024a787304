//! Dynamic time warping over skeleton sequences.
//!
//! The recurrence is the classic three-neighbour one,
//! `cost[i, j] = local[i-1, j-1] + min(cost[i-1, j], cost[i, j-1], cost[i-1, j-1])`,
//! with `cost[0, 0] = 0` and the rest of row 0 and column 0 unreachable, so
//! every frame of both sequences is consumed. Local frame distances are
//! materialized once per pair before the relaxation.
use super::frame::{frame_distance_unchecked, FrameMetric};
use crate::error::{DistanceError, EvalError, EvalResult};
use crate::types::Skeleton;
use nalgebra::DMatrix;

/// Result of one alignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alignment {
    /// Accumulated cost at `(T1, T2)`.
    pub cost: f64,
    /// Number of steps of the backtracked warping path (>= max(T1, T2)).
    pub path_len: usize,
}

impl Alignment {
    pub fn distance(&self, normalize: bool) -> f64 {
        if normalize && self.path_len > 0 {
            self.cost / self.path_len as f64
        } else {
            self.cost
        }
    }
}

/// Reusable DP buffers; one per worker thread.
#[derive(Clone, Debug)]
pub struct DtwWorkspace {
    local: DMatrix<f64>,
    cost: DMatrix<f64>,
}

impl Default for DtwWorkspace {
    fn default() -> Self {
        Self {
            local: DMatrix::zeros(0, 0),
            cost: DMatrix::zeros(0, 0),
        }
    }
}

impl DtwWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, t1: usize, t2: usize) {
        if self.local.shape() != (t1, t2) {
            self.local = DMatrix::zeros(t1, t2);
        }
        if self.cost.shape() != (t1 + 1, t2 + 1) {
            self.cost = DMatrix::from_element(t1 + 1, t2 + 1, f64::INFINITY);
        } else {
            self.cost.fill(f64::INFINITY);
        }
        self.cost[(0, 0)] = 0.0;
    }

    /// Aligns `a` against `b` under `metric`.
    pub fn align(&mut self, a: &Skeleton, b: &Skeleton, metric: FrameMetric) -> EvalResult<Alignment> {
        let (t1, t2) = (a.len(), b.len());
        if t1 == 0 || t2 == 0 {
            return Err(DistanceError::EmptySequence.into());
        }
        if a.joints() != b.joints() {
            return Err(EvalError::shape("joint count", a.joints(), b.joints()));
        }
        self.prepare(t1, t2);

        // Column-major storage: walk j in the outer loop.
        for j in 0..t2 {
            let fb = b.frame(j);
            for i in 0..t1 {
                self.local[(i, j)] = frame_distance_unchecked(a.frame(i), fb, metric);
            }
        }
        for j in 1..=t2 {
            for i in 1..=t1 {
                let best = self.cost[(i - 1, j - 1)]
                    .min(self.cost[(i - 1, j)])
                    .min(self.cost[(i, j - 1)]);
                self.cost[(i, j)] = self.local[(i - 1, j - 1)] + best;
            }
        }

        Ok(Alignment {
            cost: self.cost[(t1, t2)],
            path_len: self.backtrack(t1, t2),
        })
    }

    /// Walks back from `(t1, t2)` to the origin, always stepping to the
    /// cheapest predecessor. Ties prefer diagonal, then up (`i - 1`), then
    /// left (`j - 1`).
    fn backtrack(&self, t1: usize, t2: usize) -> usize {
        let (mut i, mut j) = (t1, t2);
        let mut steps = 0usize;
        while i > 0 || j > 0 {
            steps += 1;
            let mut next: Option<((usize, usize), f64)> = None;
            let mut consider = |cell: (usize, usize)| {
                let c = self.cost[cell];
                if next.map_or(true, |(_, best)| c < best) {
                    next = Some((cell, c));
                }
            };
            if i > 0 && j > 0 {
                consider((i - 1, j - 1));
            }
            if i > 0 {
                consider((i - 1, j));
            }
            if j > 0 {
                consider((i, j - 1));
            }
            match next {
                Some(((ni, nj), _)) => (i, j) = (ni, nj),
                None => break,
            }
        }
        steps
    }
}

/// Convenience wrapper allocating a fresh workspace.
pub fn dtw_distance(a: &Skeleton, b: &Skeleton, metric: FrameMetric, normalize: bool) -> EvalResult<f64> {
    Ok(DtwWorkspace::new().align(a, b, metric)?.distance(normalize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::frame::frame_distance;

    const EPS: f64 = 1e-9;

    /// One joint per frame, positions along the x axis.
    fn line(xs: &[f32]) -> Skeleton {
        let coords = xs.iter().flat_map(|&x| [x, 0.0, 0.0]).collect();
        Skeleton::from_flat(1, coords).unwrap()
    }

    #[test]
    fn identical_sequences_have_zero_distance() {
        let a = line(&[0.0, 1.0, 2.0, 5.0]);
        for metric in [FrameMetric::EuclideanPerJoint, FrameMetric::EuclideanFlat] {
            assert_eq!(dtw_distance(&a, &a, metric, false).unwrap(), 0.0);
            assert_eq!(dtw_distance(&a, &a, metric, true).unwrap(), 0.0);
        }
    }

    #[test]
    fn single_frames_reduce_to_frame_distance() {
        let a = Skeleton::from_flat(2, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let b = Skeleton::from_flat(2, vec![1.0, 2.0, 2.0, 1.0, 1.0, 4.0]).unwrap();
        for metric in [
            FrameMetric::EuclideanPerJoint,
            FrameMetric::EuclideanFlat,
            FrameMetric::Cosine,
        ] {
            let expected = frame_distance(a.frame(0), b.frame(0), metric).unwrap();
            let mut ws = DtwWorkspace::new();
            let alignment = ws.align(&a, &b, metric).unwrap();
            assert_eq!(alignment.path_len, 1);
            assert!((alignment.distance(false) - expected).abs() < EPS);
            assert!((alignment.distance(true) - expected).abs() < EPS);
        }
    }

    #[test]
    fn warping_absorbs_repeated_frames() {
        let a = line(&[0.0, 1.0, 2.0]);
        let b = line(&[0.0, 1.0, 1.0, 1.0, 2.0]);
        let alignment = DtwWorkspace::new()
            .align(&a, &b, FrameMetric::EuclideanPerJoint)
            .unwrap();
        assert!(alignment.cost.abs() < EPS);
        assert_eq!(alignment.path_len, 5);
    }

    #[test]
    fn hand_computed_cost_and_path() {
        // local = |a_i - b_j|: a = [0, 2], b = [1, 3, 4]
        // local rows: [1, 3, 4], [1, 1, 2]
        // cost: (1,1)=1 (1,2)=4 (1,3)=8 (2,1)=2 (2,2)=2 (2,3)=4
        let a = line(&[0.0, 2.0]);
        let b = line(&[1.0, 3.0, 4.0]);
        let alignment = DtwWorkspace::new()
            .align(&a, &b, FrameMetric::EuclideanFlat)
            .unwrap();
        assert!((alignment.cost - 4.0).abs() < EPS);
        // (2,3) -> (2,2) -> (1,1) -> (0,0)
        assert_eq!(alignment.path_len, 3);
        assert!((alignment.distance(true) - 4.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn normalized_never_exceeds_raw() {
        let a = line(&[0.0, 3.0, 1.0, 7.0, 2.0]);
        let b = line(&[4.0, 1.0, 1.0]);
        let alignment = DtwWorkspace::new()
            .align(&a, &b, FrameMetric::EuclideanPerJoint)
            .unwrap();
        assert!(alignment.path_len >= 5);
        assert!(alignment.distance(true) <= alignment.distance(false));
        assert!(alignment.distance(true) >= 0.0);
    }

    #[test]
    fn workspace_reuse_across_shapes_is_consistent() {
        let a = line(&[0.0, 3.0, 1.0]);
        let b = line(&[4.0, 1.0]);
        let c = line(&[1.0, 1.0, 2.0, 3.0]);
        let mut ws = DtwWorkspace::new();
        let ab = ws.align(&a, &b, FrameMetric::EuclideanFlat).unwrap();
        let ac = ws.align(&a, &c, FrameMetric::EuclideanFlat).unwrap();
        let ab_again = ws.align(&a, &b, FrameMetric::EuclideanFlat).unwrap();
        assert_eq!(ab, ab_again);
        assert_eq!(ac, DtwWorkspace::new().align(&a, &c, FrameMetric::EuclideanFlat).unwrap());
    }

    #[test]
    fn empty_sequence_is_an_error() {
        let empty = Skeleton::from_flat(1, Vec::new()).unwrap();
        let a = line(&[0.0]);
        let err = dtw_distance(&empty, &a, FrameMetric::EuclideanFlat, true).unwrap_err();
        assert!(matches!(err, EvalError::Distance(DistanceError::EmptySequence)));
    }

    #[test]
    fn joint_count_mismatch_is_shape_error() {
        let a = Skeleton::from_flat(1, vec![0.0; 3]).unwrap();
        let b = Skeleton::from_flat(2, vec![0.0; 6]).unwrap();
        let err = dtw_distance(&a, &b, FrameMetric::EuclideanPerJoint, true).unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { .. }));
    }
}
