//! Per-frame distance functions.
//!
//! A frame is a flat slice of `x,y,z` triples (skeleton pose) or an arbitrary
//! vector (embedding). Accumulation is done in `f64`.
use crate::error::{EvalError, EvalResult};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Frame-level metric.
///
/// The two Euclidean variants differ numerically: the per-joint variant sums
/// the L2 norms of the joint displacements, the flat variant takes one L2
/// norm over the concatenated coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameMetric {
    #[default]
    EuclideanPerJoint,
    EuclideanFlat,
    /// `1 - cos(a, b)` with the cosine clamped to [-1, 1]; 0 when both
    /// vectors are zero and 1 when exactly one is.
    Cosine,
}

impl FromStr for FrameMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean-per-joint" | "per-joint" => Ok(Self::EuclideanPerJoint),
            "euclidean-flat" | "euclidean" => Ok(Self::EuclideanFlat),
            "cosine" => Ok(Self::Cosine),
            other => Err(format!(
                "unknown metric {other:?} (expected euclidean-per-joint, euclidean-flat or cosine)"
            )),
        }
    }
}

/// Distance between two frames of equal width.
pub fn frame_distance(a: &[f32], b: &[f32], metric: FrameMetric) -> EvalResult<f64> {
    if a.len() != b.len() {
        return Err(EvalError::shape("frame width", a.len(), b.len()));
    }
    if metric == FrameMetric::EuclideanPerJoint && a.len() % 3 != 0 {
        return Err(EvalError::shape(
            "per-joint frame width (multiple of 3)",
            a.len() - a.len() % 3,
            a.len(),
        ));
    }
    Ok(frame_distance_unchecked(a, b, metric))
}

/// Caller guarantees equal widths (and a multiple of 3 for per-joint).
#[inline]
pub(crate) fn frame_distance_unchecked(a: &[f32], b: &[f32], metric: FrameMetric) -> f64 {
    match metric {
        FrameMetric::EuclideanPerJoint => euclidean_per_joint(a, b),
        FrameMetric::EuclideanFlat => euclidean_flat(a, b),
        FrameMetric::Cosine => cosine(a, b),
    }
}

#[inline]
fn joint(v: &[f32]) -> Vector3<f64> {
    Vector3::new(v[0] as f64, v[1] as f64, v[2] as f64)
}

pub fn euclidean_per_joint(a: &[f32], b: &[f32]) -> f64 {
    a.chunks_exact(3)
        .zip(b.chunks_exact(3))
        .map(|(ja, jb)| (joint(ja) - joint(jb)).norm())
        .sum()
}

pub fn euclidean_flat(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    match (na == 0.0, nb == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => {
            let sim = (dot / (na * nb).sqrt()).clamp(-1.0, 1.0);
            1.0 - sim
        }
    }
}
