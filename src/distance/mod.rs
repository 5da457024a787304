//! Distance engine: frame metrics, DTW, and the object-level dispatch used by
//! the threshold estimator and the agreement evaluator.
//!
//! Skeleton pairs are compared with DTW over frames; embedding pairs with a
//! single frame metric evaluation. Embeddings carry no joint structure, so
//! [`FrameMetric::EuclideanPerJoint`] falls back to the flat L2 norm for them.

pub mod dtw;
pub mod frame;

pub use dtw::{dtw_distance, Alignment, DtwWorkspace};
pub use frame::{cosine, euclidean_flat, euclidean_per_joint, frame_distance, FrameMetric};

use crate::error::{DistanceError, EvalError, EvalResult};
use crate::types::{Payload, PayloadKind};
use serde::{Deserialize, Serialize};

/// How one representation measures the distance between two of its objects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceParams {
    pub metric: FrameMetric,
    /// Divide the DTW cost by the warping path length.
    pub normalize: bool,
    /// Reject skeleton sequences longer than this many frames.
    pub max_sequence_len: Option<usize>,
}

impl Default for DistanceParams {
    fn default() -> Self {
        Self::skeleton()
    }
}

impl DistanceParams {
    /// Normalized DTW with summed per-joint Euclidean frame distances.
    pub fn skeleton() -> Self {
        Self {
            metric: FrameMetric::EuclideanPerJoint,
            normalize: true,
            max_sequence_len: None,
        }
    }

    /// Cosine distance between embedding vectors.
    pub fn embedding() -> Self {
        Self {
            metric: FrameMetric::Cosine,
            normalize: false,
            max_sequence_len: None,
        }
    }

    /// Default comparison for objects of `kind`.
    pub fn for_kind(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Skeleton => Self::skeleton(),
            PayloadKind::Embedding => Self::embedding(),
        }
    }

    fn check_len(&self, len: usize) -> Result<(), DistanceError> {
        match self.max_sequence_len {
            Some(max) if len > max => Err(DistanceError::SequenceTooLong { len, max }),
            _ => Ok(()),
        }
    }
}

/// Distance between two payloads of the same kind.
pub fn object_distance(
    a: &Payload,
    b: &Payload,
    params: &DistanceParams,
    ws: &mut DtwWorkspace,
) -> EvalResult<f64> {
    match (a, b) {
        (Payload::Skeleton(sa), Payload::Skeleton(sb)) => {
            params.check_len(sa.len())?;
            params.check_len(sb.len())?;
            Ok(ws.align(sa, sb, params.metric)?.distance(params.normalize))
        }
        (Payload::Embedding(ea), Payload::Embedding(eb)) => {
            if ea.dim() != eb.dim() {
                return Err(EvalError::shape("embedding dimension", ea.dim(), eb.dim()));
            }
            let metric = match params.metric {
                FrameMetric::EuclideanPerJoint => FrameMetric::EuclideanFlat,
                other => other,
            };
            frame_distance(ea.values(), eb.values(), metric)
        }
        _ => Err(DistanceError::MixedPayloads.into()),
    }
}
