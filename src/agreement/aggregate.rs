//! Mean and population standard deviation across subsets.
use super::confusion::ConfusionCounts;
use super::metrics::AgreementMetrics;
use crate::diagnostics::SubsetReport;
use crate::error::{EvalError, EvalResult};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    /// `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Some(Self {
            mean,
            std: var.sqrt(),
        })
    }
}

impl fmt::Display for MeanStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} ± {:.4}", self.mean, self.std)
    }
}

/// Per-metric spread over evaluated subsets, plus the pooled counts for
/// reference.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub subsets: usize,
    pub precision: MeanStd,
    pub recall: MeanStd,
    pub f1: MeanStd,
    #[serde(rename = "f0.25")]
    pub f025: MeanStd,
    pub accuracy: MeanStd,
    pub pooled_counts: ConfusionCounts,
}

impl MetricSummary {
    pub fn from_reports(reports: &[SubsetReport]) -> EvalResult<Self> {
        if reports.is_empty() {
            return Err(EvalError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }
        let column = |pick: fn(&AgreementMetrics) -> f64| {
            let values: Vec<f64> = reports.iter().map(|r| pick(&r.metrics)).collect();
            MeanStd::of(&values).unwrap_or_default()
        };
        Ok(Self {
            subsets: reports.len(),
            precision: column(|m| m.precision),
            recall: column(|m| m.recall),
            f1: column(|m| m.f1),
            f025: column(|m| m.f025),
            accuracy: column(|m| m.accuracy),
            pooled_counts: reports
                .iter()
                .fold(ConfusionCounts::default(), |acc, r| acc + r.counts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(subset: usize, precision: f64) -> SubsetReport {
        SubsetReport {
            subset,
            objects: 4,
            pairs: 6,
            counts: ConfusionCounts {
                true_pos: 1,
                ..Default::default()
            },
            metrics: AgreementMetrics {
                precision,
                ..Default::default()
            },
            elapsed_ms: 0.0,
        }
    }

    #[test]
    fn population_std() {
        let s = MeanStd::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std - 2.0).abs() < 1e-12);
        assert_eq!(MeanStd::of(&[3.0]).unwrap().std, 0.0);
        assert!(MeanStd::of(&[]).is_none());
    }

    #[test]
    fn summary_is_per_subset_not_pooled() {
        let summary = MetricSummary::from_reports(&[report(0, 0.5), report(1, 1.0)]).unwrap();
        assert_eq!(summary.subsets, 2);
        assert!((summary.precision.mean - 0.75).abs() < 1e-12);
        assert!((summary.precision.std - 0.25).abs() < 1e-12);
        assert_eq!(summary.pooled_counts.true_pos, 2);
    }

    #[test]
    fn empty_summary_is_an_error() {
        assert!(matches!(
            MetricSummary::from_reports(&[]),
            Err(EvalError::InsufficientData { .. })
        ));
    }
}
