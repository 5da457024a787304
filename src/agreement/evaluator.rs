//! Pairwise agreement between an oracle representation and a candidate.
//!
//! Both representations index the same objects in the same order. For each
//! pair the oracle is resolved first; a gray oracle decision ends the pair
//! without touching the candidate.

use super::aggregate::MetricSummary;
use super::confusion::{ConfusionCounts, PairOutcome};
use super::metrics::AgreementMetrics;
use crate::cancel::CancelToken;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{SubsetReport, TimingBreakdown};
use crate::distance::{object_distance, DistanceParams, DtwWorkspace};
use crate::error::{EvalError, EvalResult};
use crate::store::canonical_mismatches;
use crate::threshold::{canonical_pairs, sample_indices, subset_rng};
use crate::types::{MotionObject, ThresholdPair};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One representation of the object collection with its distance and
/// thresholds.
#[derive(Clone, Copy, Debug)]
pub struct Representation<'a> {
    pub objects: &'a [MotionObject],
    pub distance: DistanceParams,
    pub thresholds: ThresholdPair,
}

impl<'a> Representation<'a> {
    pub fn new(objects: &'a [MotionObject], distance: DistanceParams, thresholds: ThresholdPair) -> Self {
        Self {
            objects,
            distance,
            thresholds,
        }
    }

    fn distance(&self, i: usize, j: usize, ws: &mut DtwWorkspace) -> EvalResult<f64> {
        object_distance(&self.objects[i].payload, &self.objects[j].payload, &self.distance, ws)
    }
}

/// Repeated random subsets evaluated independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsetPlan {
    pub n_subsets: usize,
    pub subset_size: usize,
    pub seed: u64,
}

impl Default for SubsetPlan {
    fn default() -> Self {
        Self {
            n_subsets: 10,
            subset_size: 1000,
            seed: 0,
        }
    }
}

/// Per-subset reports and their summary.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRun {
    pub subsets: Vec<SubsetReport>,
    pub summary: MetricSummary,
    pub timings: TimingBreakdown,
}

pub struct AgreementEvaluator<'a> {
    oracle: Representation<'a>,
    candidate: Representation<'a>,
    cancel: CancelToken,
}

impl<'a> AgreementEvaluator<'a> {
    /// Fails when the two collections differ in length or a threshold is
    /// not finite.
    pub fn new(oracle: Representation<'a>, candidate: Representation<'a>) -> EvalResult<Self> {
        if oracle.objects.len() != candidate.objects.len() {
            return Err(EvalError::shape(
                "corresponding representations",
                oracle.objects.len(),
                candidate.objects.len(),
            ));
        }
        for (name, t) in [("oracle", oracle.thresholds), ("candidate", candidate.thresholds)] {
            if !t.similar.is_finite() || !t.dissimilar.is_finite() {
                return Err(EvalError::InvalidThresholds(format!(
                    "{name} thresholds ({}, {}) are not finite",
                    t.similar, t.dissimilar
                )));
            }
        }
        Ok(Self {
            oracle,
            candidate,
            cancel: CancelToken::new(),
        })
    }

    /// Observe `cancel` between subsets.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn len(&self) -> usize {
        self.oracle.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracle.objects.is_empty()
    }

    /// Positions whose ids disagree once the trailing id component is dropped.
    pub fn key_mismatches(&self) -> Vec<usize> {
        canonical_mismatches(self.oracle.objects, self.candidate.objects)
    }

    /// Warns about id disagreements, or fails on them when `strict`.
    /// Returns the number of disagreeing positions.
    pub fn verify_keys(&self, strict: bool) -> EvalResult<usize> {
        let mismatches = self.key_mismatches();
        let Some(&position) = mismatches.first() else {
            return Ok(0);
        };
        let err = EvalError::KeyMismatch {
            count: mismatches.len(),
            position,
            left: self.oracle.objects[position].id.clone(),
            right: self.candidate.objects[position].id.clone(),
        };
        if strict {
            return Err(err);
        }
        warn!("{err}");
        Ok(mismatches.len())
    }

    pub fn classify_pair(&self, i: usize, j: usize, ws: &mut DtwWorkspace) -> EvalResult<PairOutcome> {
        let Some(oracle) = self.oracle.thresholds.classify(self.oracle.distance(i, j, ws)?) else {
            return Ok(PairOutcome::GrayA);
        };
        let outcome = match self.candidate.thresholds.classify(self.candidate.distance(i, j, ws)?) {
            Some(candidate) => PairOutcome::from_labels(oracle, candidate),
            None => PairOutcome::GrayB { oracle },
        };
        Ok(outcome)
    }

    /// Counts for an explicit list of index pairs, evaluated in parallel.
    pub fn evaluate_pairs(&self, pairs: &[(usize, usize)]) -> EvalResult<ConfusionCounts> {
        let n = self.len();
        if let Some(&(i, j)) = pairs.iter().find(|&&(i, j)| i >= n || j >= n) {
            return Err(EvalError::InsufficientData {
                needed: i.max(j) + 1,
                available: n,
            });
        }
        pairs
            .par_iter()
            .map_init(DtwWorkspace::default, |ws, &(i, j)| self.classify_pair(i, j, ws))
            .try_fold(ConfusionCounts::default, |mut acc, outcome| {
                acc.record(outcome?);
                Ok::<_, EvalError>(acc)
            })
            .try_reduce(ConfusionCounts::default, |a, b| Ok(a + b))
    }

    /// Counts over the canonical pairs of `indices`.
    pub fn evaluate_indices(&self, indices: &[usize]) -> EvalResult<ConfusionCounts> {
        let pairs: Vec<(usize, usize)> = canonical_pairs(indices.len())
            .into_iter()
            .map(|(a, b)| (indices[a], indices[b]))
            .collect();
        self.evaluate_pairs(&pairs)
    }

    /// Every canonical pair of the collection, reported as a single subset.
    pub fn evaluate_all(&self) -> EvalResult<AgreementRun> {
        self.require_pairs()?;
        let start = Instant::now();
        let indices: Vec<usize> = (0..self.len()).collect();
        let report = self.report(0, &indices, start)?;
        self.finish(vec![report])
    }

    /// `plan.n_subsets` seeded subsets of `plan.subset_size` objects (capped
    /// at the collection size), each reported on its own.
    pub fn evaluate_subsets(&self, plan: &SubsetPlan) -> EvalResult<AgreementRun> {
        self.require_pairs()?;
        if plan.n_subsets == 0 || plan.subset_size < 2 {
            return Err(EvalError::Config(format!(
                "need at least one subset of two objects, got {} x {}",
                plan.n_subsets, plan.subset_size
            )));
        }
        let size = plan.subset_size.min(self.len());
        if size < plan.subset_size {
            info!("subset size {} capped to {} objects", plan.subset_size, self.len());
        }
        let mut reports = Vec::with_capacity(plan.n_subsets);
        for subset in 0..plan.n_subsets {
            self.cancel.check()?;
            let start = Instant::now();
            let indices = sample_indices(&mut subset_rng(plan.seed, subset), self.len(), size);
            let report = self.report(subset, &indices, start)?;
            debug!(
                "subset {}/{}: {} pairs, P={:.4} R={:.4} gray_a={} gray_b={}",
                subset + 1,
                plan.n_subsets,
                report.pairs,
                report.metrics.precision,
                report.metrics.recall,
                report.counts.gray_a,
                report.counts.gray_b
            );
            reports.push(report);
        }
        self.finish(reports)
    }

    fn require_pairs(&self) -> EvalResult<()> {
        if self.len() < 2 {
            return Err(EvalError::InsufficientData {
                needed: 2,
                available: self.len(),
            });
        }
        Ok(())
    }

    fn report(&self, subset: usize, indices: &[usize], start: Instant) -> EvalResult<SubsetReport> {
        let counts = self.evaluate_indices(indices)?;
        Ok(SubsetReport {
            subset,
            objects: indices.len(),
            pairs: counts.total() as usize,
            counts,
            metrics: AgreementMetrics::from_counts(&counts),
            elapsed_ms: elapsed_ms(start),
        })
    }

    fn finish(&self, subsets: Vec<SubsetReport>) -> EvalResult<AgreementRun> {
        let summary = MetricSummary::from_reports(&subsets)?;
        let mut timings = TimingBreakdown::default();
        for r in &subsets {
            timings.push(format!("subset {}", r.subset), r.elapsed_ms);
        }
        Ok(AgreementRun {
            subsets,
            summary,
            timings,
        })
    }
}
