//! JSON configuration files for the command-line tools.
//!
//! Every section uses `#[serde(default)]`, so a config only needs the keys it
//! changes. Command-line flags are applied on top of the loaded values.

pub mod distance;
pub mod evaluation;
pub mod threshold;

pub use distance::RepresentationConfig;
pub use evaluation::EvaluationToolConfig;
pub use threshold::ThresholdToolConfig;

use crate::error::{EvalError, EvalResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub(crate) fn read_config<T: DeserializeOwned>(path: &Path) -> EvalResult<T> {
    let data = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    serde_json::from_str(&data)
        .map_err(|e| EvalError::Config(format!("failed to parse config {}: {e}", path.display())))
}
