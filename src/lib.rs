#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod agreement;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod store;
pub mod threshold;
pub mod types;

// Numerical building blocks.
pub mod cancel;
pub mod distance;

// --- High-level re-exports -------------------------------------------------

// Main entry points: estimator + evaluator.
pub use crate::agreement::{AgreementEvaluator, AgreementRun, Representation, SubsetPlan};
pub use crate::threshold::{ThresholdEstimate, ThresholdEstimator, ThresholdParams};

// Data model and errors.
pub use crate::error::{EvalError, EvalResult};
pub use crate::types::{MotionObject, Payload, ThresholdPair};

pub use crate::cancel::CancelToken;
pub use crate::distance::{DistanceParams, FrameMetric};
pub use crate::store::{ObjectSource, ObjectStore, ReaderOptions};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for scripts and tests.
///
/// ```no_run
/// use motion_agreement::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> EvalResult<()> {
/// let store = ObjectStore::load(Path::new("skeletons.data.gz"), &ReaderOptions::default(), None)?;
/// let estimate = ThresholdEstimator::new(ThresholdParams::default()).estimate(&store.objects, None)?;
/// println!("p0.5={:.6} p40={:.6}", estimate.thresholds.similar, estimate.thresholds.dissimilar);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::agreement::{AgreementEvaluator, Representation, SubsetPlan};
    pub use crate::store::{ObjectStore, ReaderOptions};
    pub use crate::threshold::{ThresholdEstimator, ThresholdParams};
    pub use crate::{DistanceParams, EvalResult, FrameMetric, MotionObject, ThresholdPair};
}
