use super::read_config;
use super::RepresentationConfig;
use crate::agreement::SubsetPlan;
use crate::error::EvalResult;
use crate::threshold::ThresholdOrderPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationToolConfig {
    /// Oracle representation.
    pub skeleton: RepresentationConfig,
    /// Representation under test.
    pub embedding: RepresentationConfig,
    pub plan: SubsetPlan,
    /// Evaluate every pair once instead of random subsets.
    pub all_pairs: bool,
    /// Abort when the two files disagree on canonical ids.
    pub strict_keys: bool,
    pub order_policy: ThresholdOrderPolicy,
    pub json_out: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> EvalResult<EvaluationToolConfig> {
    read_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::FrameMetric;
    use crate::types::PayloadKind;

    #[test]
    fn embedding_defaults_to_cosine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");
        std::fs::write(
            &path,
            r#"{"plan": {"n_subsets": 3}, "strict_keys": true, "embedding": {"reader": {"max_objects": 5}}}"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.plan.n_subsets, 3);
        assert_eq!(cfg.plan.subset_size, 1000);
        assert!(cfg.strict_keys);
        assert_eq!(cfg.embedding.reader.max_objects, Some(5));
        let skeleton = cfg.skeleton.distance_for(PayloadKind::Skeleton);
        assert_eq!(skeleton.metric, FrameMetric::EuclideanPerJoint);
        let embedding = cfg.embedding.distance_for(PayloadKind::Embedding);
        assert_eq!(embedding.metric, FrameMetric::Cosine);
        assert!(!embedding.normalize);
    }
}
