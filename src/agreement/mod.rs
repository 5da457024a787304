//! Agreement between two representations of one object collection.
//!
//! [`AgreementEvaluator`] classifies index pairs into [`ConfusionCounts`];
//! [`AgreementMetrics`] derives precision, recall, F-scores and accuracy from
//! them; [`MetricSummary`] reports mean ± std across subsets.

pub mod aggregate;
pub mod confusion;
pub mod evaluator;
pub mod metrics;

pub use aggregate::{MeanStd, MetricSummary};
pub use confusion::{ConfusionCounts, PairOutcome};
pub use evaluator::{AgreementEvaluator, AgreementRun, Representation, SubsetPlan};
pub use metrics::{f_beta, AgreementMetrics, PRECISION_BETA};
