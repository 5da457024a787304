//! Core data model: motion objects, their payloads, and threshold pairs.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One object of the store: an identifier plus its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionObject {
    pub id: String,
    pub payload: Payload,
}

impl MotionObject {
    pub fn skeleton(id: impl Into<String>, skeleton: Skeleton) -> Self {
        Self {
            id: id.into(),
            payload: Payload::Skeleton(skeleton),
        }
    }

    pub fn embedding(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            payload: Payload::Embedding(Embedding::new(values)),
        }
    }
}

/// Skeleton sequences and embedding vectors are distinguished statically.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Skeleton(Skeleton),
    Embedding(Embedding),
}

impl Payload {
    /// Values per item: coordinates per frame for skeletons, dimension for embeddings.
    pub fn item_width(&self) -> usize {
        match self {
            Payload::Skeleton(s) => s.joints() * 3,
            Payload::Embedding(e) => e.dim(),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Skeleton(_) => PayloadKind::Skeleton,
            Payload::Embedding(_) => PayloadKind::Embedding,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Skeleton,
    Embedding,
}

/// A sequence of poses stored frame-major as flat `x,y,z` triples.
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    joints: usize,
    coords: Vec<f32>,
}

impl Skeleton {
    /// Builds a skeleton from flat coordinates; `coords.len()` must be a
    /// multiple of `joints * 3`.
    pub fn from_flat(joints: usize, coords: Vec<f32>) -> Option<Self> {
        if joints == 0 || coords.len() % (joints * 3) != 0 {
            return None;
        }
        Some(Self { joints, coords })
    }

    /// Builds a skeleton from per-frame joint positions. All frames must have
    /// the same non-zero number of joints.
    pub fn from_frames(frames: &[Vec<Vector3<f32>>]) -> Option<Self> {
        let joints = frames.first()?.len();
        if joints == 0 || frames.iter().any(|f| f.len() != joints) {
            return None;
        }
        let coords = frames
            .iter()
            .flat_map(|f| f.iter().flat_map(|j| [j.x, j.y, j.z]))
            .collect();
        Some(Self { joints, coords })
    }

    pub fn joints(&self) -> usize {
        self.joints
    }

    pub fn len(&self) -> usize {
        self.coords.len() / (self.joints * 3)
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Flat coordinates of frame `index`.
    pub fn frame(&self, index: usize) -> &[f32] {
        let width = self.joints * 3;
        &self.coords[index * width..(index + 1) * width]
    }

    pub fn frames(&self) -> impl Iterator<Item = &[f32]> {
        self.coords.chunks_exact(self.joints * 3)
    }

    /// Repeats the last frame until the sequence has `frames` frames.
    pub fn pad_to(&mut self, frames: usize) {
        let current = self.len();
        if current == 0 || current >= frames {
            return;
        }
        let last = self.frame(current - 1).to_vec();
        for _ in current..frames {
            self.coords.extend_from_slice(&last);
        }
    }
}

/// A single fixed-length embedding vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Identifier with its trailing underscore component removed; two
/// representations of one object agree on this prefix.
pub fn canonical_id(id: &str) -> &str {
    id.rsplit_once('_').map(|(head, _)| head).unwrap_or(id)
}

/// Binary decision of one representation about one pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Similar,
    Dissimilar,
}

/// Low ("similar") and high ("dissimilar") distance cut points.
///
/// Serialized with the fixed field names `p0.5` and `p40`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    #[serde(rename = "p0.5")]
    pub similar: f64,
    #[serde(rename = "p40")]
    pub dissimilar: f64,
}

impl ThresholdPair {
    pub fn new(similar: f64, dissimilar: f64) -> Self {
        Self {
            similar,
            dissimilar,
        }
    }

    /// Three-way rule: strictly below `similar`, strictly above
    /// `dissimilar`, otherwise gray (`None`).
    #[inline]
    pub fn classify(&self, distance: f64) -> Option<Label> {
        if distance < self.similar {
            Some(Label::Similar)
        } else if distance > self.dissimilar {
            Some(Label::Dissimilar)
        } else {
            None
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.similar <= self.dissimilar
    }
}
