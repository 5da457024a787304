use crate::types::Label;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Where one evaluated pair ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairOutcome {
    /// Both representations call the pair similar.
    TruePositive,
    /// Oracle dissimilar, candidate similar.
    FalsePositive,
    /// Oracle similar, candidate dissimilar.
    FalseNegative,
    TrueNegative,
    /// The oracle's distance fell between its thresholds.
    GrayA,
    /// The oracle decided, the candidate did not.
    GrayB { oracle: Label },
}

impl PairOutcome {
    pub fn from_labels(oracle: Label, candidate: Label) -> Self {
        match (oracle, candidate) {
            (Label::Similar, Label::Similar) => PairOutcome::TruePositive,
            (Label::Dissimilar, Label::Similar) => PairOutcome::FalsePositive,
            (Label::Similar, Label::Dissimilar) => PairOutcome::FalseNegative,
            (Label::Dissimilar, Label::Dissimilar) => PairOutcome::TrueNegative,
        }
    }
}

/// 2x2 confusion matrix plus the two gray-zone counters.
///
/// Every attempted pair lands in exactly one of the six buckets, so
/// [`total`](Self::total) equals the number of pairs evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionCounts {
    pub true_pos: u64,
    pub false_pos: u64,
    pub false_neg: u64,
    pub true_neg: u64,
    pub gray_a: u64,
    pub gray_b: u64,
    /// Part of `gray_b` where the oracle said "similar".
    pub gray_b_when_a_similar: u64,
}

impl ConfusionCounts {
    pub fn record(&mut self, outcome: PairOutcome) {
        match outcome {
            PairOutcome::TruePositive => self.true_pos += 1,
            PairOutcome::FalsePositive => self.false_pos += 1,
            PairOutcome::FalseNegative => self.false_neg += 1,
            PairOutcome::TrueNegative => self.true_neg += 1,
            PairOutcome::GrayA => self.gray_a += 1,
            PairOutcome::GrayB { oracle } => {
                self.gray_b += 1;
                if oracle == Label::Similar {
                    self.gray_b_when_a_similar += 1;
                }
            }
        }
    }

    /// Pairs with a definite label from both sides.
    pub fn decided(&self) -> u64 {
        self.true_pos + self.false_pos + self.false_neg + self.true_neg
    }

    pub fn total(&self) -> u64 {
        self.decided() + self.gray_a + self.gray_b
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.true_pos += rhs.true_pos;
        self.false_pos += rhs.false_pos;
        self.false_neg += rhs.false_neg;
        self.true_neg += rhs.true_neg;
        self.gray_a += rhs.gray_a;
        self.gray_b += rhs.gray_b;
        self.gray_b_when_a_similar += rhs.gray_b_when_a_similar;
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_outcome_lands_in_one_bucket() {
        let outcomes = [
            PairOutcome::TruePositive,
            PairOutcome::FalsePositive,
            PairOutcome::FalseNegative,
            PairOutcome::TrueNegative,
            PairOutcome::GrayA,
            PairOutcome::GrayB {
                oracle: Label::Similar,
            },
            PairOutcome::GrayB {
                oracle: Label::Dissimilar,
            },
        ];
        let mut counts = ConfusionCounts::default();
        for o in outcomes {
            counts.record(o);
        }
        assert_eq!(counts.total(), outcomes.len() as u64);
        assert_eq!(counts.decided(), 4);
        assert_eq!(counts.gray_b, 2);
        assert_eq!(counts.gray_b_when_a_similar, 1);
    }

    #[test]
    fn label_combinations() {
        use Label::*;
        assert_eq!(PairOutcome::from_labels(Similar, Similar), PairOutcome::TruePositive);
        assert_eq!(PairOutcome::from_labels(Similar, Dissimilar), PairOutcome::FalseNegative);
        assert_eq!(PairOutcome::from_labels(Dissimilar, Similar), PairOutcome::FalsePositive);
        assert_eq!(PairOutcome::from_labels(Dissimilar, Dissimilar), PairOutcome::TrueNegative);
    }

    #[test]
    fn counts_add_fieldwise() {
        let a = ConfusionCounts {
            true_pos: 1,
            gray_a: 2,
            ..Default::default()
        };
        let b = ConfusionCounts {
            true_pos: 3,
            gray_b: 1,
            gray_b_when_a_similar: 1,
            ..Default::default()
        };
        let sum = a + b;
        assert_eq!(sum.true_pos, 4);
        assert_eq!(sum.total(), 7);
    }
}
