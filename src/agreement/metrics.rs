use super::confusion::ConfusionCounts;
use serde::{Deserialize, Serialize};

/// Weight of precision in the precision-favouring F-score.
pub const PRECISION_BETA: f64 = 0.25;

/// Agreement of the candidate with the oracle over decided pairs.
///
/// Each ratio is 0 when its denominator is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgreementMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    #[serde(rename = "f0.25")]
    pub f025: f64,
    pub accuracy: f64,
}

impl AgreementMetrics {
    pub fn from_counts(c: &ConfusionCounts) -> Self {
        let precision = ratio(c.true_pos, c.true_pos + c.false_pos);
        let recall = ratio(c.true_pos, c.true_pos + c.false_neg);
        Self {
            precision,
            recall,
            f1: f_beta(precision, recall, 1.0),
            f025: f_beta(precision, recall, PRECISION_BETA),
            accuracy: ratio(c.true_pos + c.true_neg, c.decided()),
        }
    }
}

/// `(1 + b^2) P R / (b^2 P + R)`, or 0 when the denominator is 0.
pub fn f_beta(precision: f64, recall: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let den = b2 * precision + recall;
    if den == 0.0 {
        0.0
    } else {
        (1.0 + b2) * precision * recall / den
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
