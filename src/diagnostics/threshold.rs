use super::{ReadStats, TimingBreakdown};
use serde::Serialize;

/// Percentiles of one random subset.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatPercentiles {
    pub repeat: usize,
    pub objects: usize,
    pub pairs: usize,
    pub low: f64,
    pub high: f64,
    pub elapsed_ms: f64,
}

/// Trace of a threshold estimation run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdTrace {
    /// Objects eligible for sampling after filtering.
    pub universe: usize,
    pub per_repeat: Vec<RepeatPercentiles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadStats>,
    pub timings: TimingBreakdown,
}
