//! Percentile threshold estimation over repeated random subsets.
//!
//! Each repeat draws `subset_size` objects (uniformly without replacement, or
//! with a reservoir when streaming from disk), computes every canonical pair
//! distance, and takes the low and high percentiles of that sample. The
//! reported pair is the mean of the per-repeat low percentiles and the mean
//! of the per-repeat high percentiles, taken independently.

use super::pairwise::pairwise_distances;
use super::percentile::percentiles;
use super::sampling::{sample_indices, subset_rng, Reservoir};
use crate::cancel::CancelToken;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{RepeatPercentiles, ThresholdTrace};
use crate::distance::DistanceParams;
use crate::error::{EvalError, EvalResult};
use crate::store::{for_each_object, IdFilter, ObjectSource};
use crate::types::{MotionObject, PayloadKind, ThresholdPair};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::str::FromStr;
use std::time::Instant;

/// What to do when the low threshold ends up above the high one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdOrderPolicy {
    Ignore,
    #[default]
    Warn,
    Reject,
}

impl ThresholdOrderPolicy {
    pub fn check(self, pair: &ThresholdPair, context: &str) -> EvalResult<()> {
        if pair.is_ordered() {
            return Ok(());
        }
        let msg = format!(
            "{context}: similar threshold {} exceeds dissimilar threshold {}",
            pair.similar, pair.dissimilar
        );
        match self {
            ThresholdOrderPolicy::Ignore => Ok(()),
            ThresholdOrderPolicy::Warn => {
                warn!("{msg}");
                Ok(())
            }
            ThresholdOrderPolicy::Reject => Err(EvalError::InvalidThresholds(msg)),
        }
    }
}

impl FromStr for ThresholdOrderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown threshold order policy '{other}'")),
        }
    }
}

/// Parameters of one estimation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub subset_size: usize,
    pub repeats: usize,
    pub seed: u64,
    /// Percentile (0..=100) giving the "similar" cut point.
    pub low_percentile: f64,
    /// Percentile (0..=100) giving the "dissimilar" cut point.
    pub high_percentile: f64,
    /// Unset means the default for the sampled payload kind.
    pub distance: Option<DistanceParams>,
    pub order_policy: ThresholdOrderPolicy,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            subset_size: 1000,
            repeats: 1,
            seed: 0,
            low_percentile: 0.5,
            high_percentile: 40.0,
            distance: None,
            order_policy: ThresholdOrderPolicy::default(),
        }
    }
}

impl ThresholdParams {
    /// Distance used for objects of `kind`.
    pub fn distance_for(&self, kind: PayloadKind) -> DistanceParams {
        self.distance.unwrap_or_else(|| DistanceParams::for_kind(kind))
    }

    pub fn validate(&self) -> EvalResult<()> {
        if self.subset_size < 2 {
            return Err(EvalError::Config(format!(
                "subset_size must be at least 2, got {}",
                self.subset_size
            )));
        }
        if self.repeats == 0 {
            return Err(EvalError::Config("repeats must be at least 1".into()));
        }
        for p in [self.low_percentile, self.high_percentile] {
            if !(0.0..=100.0).contains(&p) {
                return Err(EvalError::Config(format!(
                    "percentile {p} is outside [0, 100]"
                )));
            }
        }
        Ok(())
    }
}

/// Estimated thresholds plus the per-repeat trace they were averaged from.
#[derive(Clone, Debug)]
pub struct ThresholdEstimate {
    pub thresholds: ThresholdPair,
    pub trace: ThresholdTrace,
}

pub struct ThresholdEstimator {
    params: ThresholdParams,
    cancel: CancelToken,
}

impl ThresholdEstimator {
    pub fn new(params: ThresholdParams) -> Self {
        Self {
            params,
            cancel: CancelToken::new(),
        }
    }

    /// Observe `cancel` between repeats.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// Samples from an in-memory collection. Only objects accepted by
    /// `filter` form the universe.
    pub fn estimate(
        &self,
        objects: &[MotionObject],
        filter: Option<&IdFilter>,
    ) -> EvalResult<ThresholdEstimate> {
        self.params.validate()?;
        let universe: Vec<&MotionObject> = objects
            .iter()
            .filter(|o| filter.map_or(true, |f| f.matches(&o.id)))
            .collect();
        if universe.len() < 2 {
            return Err(EvalError::InsufficientData {
                needed: 2,
                available: universe.len(),
            });
        }
        let size = self.params.subset_size.min(universe.len());
        if size < self.params.subset_size {
            info!(
                "subset size {} capped to universe of {} objects",
                self.params.subset_size,
                universe.len()
            );
        }

        let mut trace = ThresholdTrace {
            universe: universe.len(),
            ..Default::default()
        };
        for repeat in 0..self.params.repeats {
            self.cancel.check()?;
            let start = Instant::now();
            let mut rng = subset_rng(self.params.seed, repeat);
            let subset: Vec<&MotionObject> = sample_indices(&mut rng, universe.len(), size)
                .into_iter()
                .map(|i| universe[i])
                .collect();
            let row = self.run_repeat(repeat, &subset, start)?;
            trace.per_repeat.push(row);
        }
        self.finish(trace)
    }

    /// Samples while streaming `source`, keeping only the reservoir in memory.
    /// The file is re-read once per repeat.
    pub fn estimate_streaming(
        &self,
        source: &ObjectSource,
        filter: Option<&IdFilter>,
    ) -> EvalResult<ThresholdEstimate> {
        self.params.validate()?;
        let cap = source.options.max_objects;
        let mut trace = ThresholdTrace::default();
        for repeat in 0..self.params.repeats {
            self.cancel.check()?;
            let start = Instant::now();
            let mut rng = subset_rng(self.params.seed, repeat);
            let mut reservoir = Reservoir::new(self.params.subset_size);
            let mut reader = source.open()?;
            let stats = for_each_object(&mut reader, filter, |object| {
                reservoir.offer(object, &mut rng);
                match cap {
                    Some(max) if reservoir.seen() >= max => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            })?;
            if reservoir.len() < 2 {
                return Err(EvalError::InsufficientData {
                    needed: 2,
                    available: reservoir.len(),
                });
            }
            trace.universe = reservoir.seen();
            trace.read = Some(stats);
            let kept = reservoir.into_sorted();
            let subset: Vec<&MotionObject> = kept.iter().collect();
            let row = self.run_repeat(repeat, &subset, start)?;
            trace.per_repeat.push(row);
        }
        self.finish(trace)
    }

    fn run_repeat(
        &self,
        repeat: usize,
        subset: &[&MotionObject],
        start: Instant,
    ) -> EvalResult<RepeatPercentiles> {
        let kind = subset
            .first()
            .map_or(PayloadKind::Skeleton, |o| o.payload.kind());
        let mut distances = pairwise_distances(subset, &self.params.distance_for(kind))?;
        let pairs = distances.len();
        let qs = [self.params.low_percentile, self.params.high_percentile];
        let ps = percentiles(&mut distances, &qs).ok_or(EvalError::InsufficientData {
            needed: 2,
            available: subset.len(),
        })?;
        debug!(
            "repeat {}/{}: {} objects, {} pairs, p{}={:.6} p{}={:.6}",
            repeat + 1,
            self.params.repeats,
            subset.len(),
            pairs,
            qs[0],
            ps[0],
            qs[1],
            ps[1]
        );
        Ok(RepeatPercentiles {
            repeat,
            objects: subset.len(),
            pairs,
            low: ps[0],
            high: ps[1],
            elapsed_ms: elapsed_ms(start),
        })
    }

    fn finish(&self, mut trace: ThresholdTrace) -> EvalResult<ThresholdEstimate> {
        let n = trace.per_repeat.len() as f64;
        let low = trace.per_repeat.iter().map(|r| r.low).sum::<f64>() / n;
        let high = trace.per_repeat.iter().map(|r| r.high).sum::<f64>() / n;
        let thresholds = ThresholdPair::new(low, high);
        self.params
            .order_policy
            .check(&thresholds, "estimated thresholds")?;
        for row in &trace.per_repeat {
            trace.timings.push(format!("repeat {}", row.repeat), row.elapsed_ms);
        }
        Ok(ThresholdEstimate { thresholds, trace })
    }
}
