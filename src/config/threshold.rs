use super::read_config;
use crate::error::EvalResult;
use crate::store::ReaderOptions;
use crate::threshold::ThresholdParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdToolConfig {
    pub reader: ReaderOptions,
    pub threshold: ThresholdParams,
    /// One valid id per line; objects outside the list are not sampled.
    pub train_ids: Option<PathBuf>,
    /// Reservoir-sample from the file instead of loading it.
    pub streaming: bool,
    pub output: ThresholdOutputConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdOutputConfig {
    /// `{"p0.5", "p40"}` record.
    pub thresholds: Option<PathBuf>,
    /// Full run report.
    pub json_out: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> EvalResult<ThresholdToolConfig> {
    read_config(path)
}
