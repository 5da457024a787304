use crate::agreement::{AgreementMetrics, ConfusionCounts};
use serde::Serialize;

/// Counts and metrics of one evaluated subset.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetReport {
    pub subset: usize,
    pub objects: usize,
    pub pairs: usize,
    pub counts: ConfusionCounts,
    pub metrics: AgreementMetrics,
    pub elapsed_ms: f64,
}
