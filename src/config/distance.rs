use crate::distance::DistanceParams;
use crate::store::ReaderOptions;
use crate::types::PayloadKind;
use serde::{Deserialize, Serialize};

/// How one representation file is read and compared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentationConfig {
    pub reader: ReaderOptions,
    /// Unset means the default for the file's payload kind.
    pub distance: Option<DistanceParams>,
}

impl RepresentationConfig {
    pub fn distance_for(&self, kind: PayloadKind) -> DistanceParams {
        self.distance.unwrap_or_else(|| DistanceParams::for_kind(kind))
    }
}
