mod common;

use common::synthetic_store::{scenario_embeddings, scenario_skeletons};
use common::{assert_close, init_logging};
use motion_agreement::agreement::{AgreementEvaluator, Representation};
use motion_agreement::distance::{dtw_distance, FrameMetric};
use motion_agreement::store::{save_objects, ObjectStore, ReaderOptions, WriterOptions};
use motion_agreement::threshold::{
    load_thresholds, pairwise_distances, save_thresholds, ThresholdEstimator, ThresholdParams,
};
use motion_agreement::types::{MotionObject, Payload, ThresholdPair};
use motion_agreement::DistanceParams;

fn skeleton_of(o: &MotionObject) -> &motion_agreement::types::Skeleton {
    match &o.payload {
        Payload::Skeleton(s) => s,
        other => panic!("expected skeleton, got {other:?}"),
    }
}

#[test]
fn hand_computed_dtw_distances() {
    let objs = scenario_skeletons();
    // Aligned frames differ by (dx, 0, 0) per joint; the diagonal path of
    // length 2 is optimal, so the normalized distance is 3 |dx|.
    let expected = [
        ((0, 1), 0.375),
        ((0, 2), 3.0),
        ((0, 3), 9.0),
        ((1, 2), 2.625),
        ((1, 3), 8.625),
        ((2, 3), 6.0),
    ];
    for ((i, j), d) in expected {
        let a = skeleton_of(&objs[i]);
        let b = skeleton_of(&objs[j]);
        let normalized = dtw_distance(a, b, FrameMetric::EuclideanPerJoint, true).unwrap();
        let raw = dtw_distance(a, b, FrameMetric::EuclideanPerJoint, false).unwrap();
        assert_close(normalized, d, 1e-9);
        assert_close(raw, 2.0 * d, 1e-9);
    }

    let refs: Vec<&MotionObject> = objs.iter().collect();
    let all = pairwise_distances(&refs, &DistanceParams::skeleton()).unwrap();
    let flat: Vec<f64> = expected.iter().map(|(_, d)| *d).collect();
    for (got, want) in all.iter().zip(&flat) {
        assert_close(*got, *want, 1e-9);
    }
}

#[test]
fn end_to_end_through_files() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let skel_path = dir.path().join("skeletons.data.gz");
    let emb_path = dir.path().join("embeddings.data");
    save_objects(&skel_path, &scenario_skeletons(), &WriterOptions::default()).unwrap();
    save_objects(&emb_path, &scenario_embeddings(), &WriterOptions::default()).unwrap();

    let options = ReaderOptions::default();
    let skel = ObjectStore::load(&skel_path, &options, None).unwrap();
    let emb = ObjectStore::load(&emb_path, &options, None).unwrap();
    assert_eq!(skel.len(), 4);
    assert_eq!(emb.len(), 4);

    // Subset = universe: sorted distances 0.375 2.625 3 6 8.625 9.
    // p0.5 at rank 0.025 -> 0.375 + 0.025 * 2.25; p40 at rank 2 -> 3.
    let params = ThresholdParams {
        subset_size: 4,
        repeats: 2,
        seed: 3,
        ..Default::default()
    };
    let estimate = ThresholdEstimator::new(params).estimate(&skel.objects, None).unwrap();
    assert_close(estimate.thresholds.similar, 0.43125, 1e-9);
    assert_close(estimate.thresholds.dissimilar, 3.0, 1e-9);

    let skel_thresh = dir.path().join("thresholds").join("skeleton.json");
    let emb_thresh = dir.path().join("thresholds").join("embedding.json");
    save_thresholds(&skel_thresh, &estimate.thresholds).unwrap();
    save_thresholds(&emb_thresh, &ThresholdPair::new(1.0, 4.0)).unwrap();
    let t_skel = load_thresholds(&skel_thresh).unwrap();
    let t_emb = load_thresholds(&emb_thresh).unwrap();

    let flat = DistanceParams {
        metric: FrameMetric::EuclideanFlat,
        ..DistanceParams::embedding()
    };
    let evaluator = AgreementEvaluator::new(
        Representation::new(&skel.objects, DistanceParams::skeleton(), t_skel),
        Representation::new(&emb.objects, flat, t_emb),
    )
    .unwrap();
    assert_eq!(evaluator.verify_keys(true).unwrap(), 0);

    // A: (0,1) similar; (0,2) (1,2) gray; (0,3) (1,3) (2,3) dissimilar.
    // B: (0,1)=0.5 similar -> TP; (0,3)=4.375 dissimilar -> TN;
    //    (1,3)=3.875 gray -> grayB; (2,3)=0.5 similar -> FP.
    let run = evaluator.evaluate_all().unwrap();
    assert_eq!(run.subsets.len(), 1);
    let c = run.subsets[0].counts;
    assert_eq!(c.true_pos, 1);
    assert_eq!(c.false_pos, 1);
    assert_eq!(c.false_neg, 0);
    assert_eq!(c.true_neg, 1);
    assert_eq!(c.gray_a, 2);
    assert_eq!(c.gray_b, 1);
    assert_eq!(c.gray_b_when_a_similar, 0);
    assert_eq!(c.total(), 6);

    let m = run.subsets[0].metrics;
    assert_close(m.precision, 0.5, 1e-12);
    assert_close(m.recall, 1.0, 1e-12);
    assert_close(m.f1, 2.0 / 3.0, 1e-12);
    assert_close(m.accuracy, 2.0 / 3.0, 1e-12);
    assert_close(run.summary.precision.mean, 0.5, 1e-12);
    assert_eq!(run.summary.precision.std, 0.0);
}

#[test]
fn identical_representations_agree_perfectly() {
    let objs = scenario_skeletons();
    let t = ThresholdPair::new(0.43125, 3.0);
    let rep = Representation::new(&objs, DistanceParams::skeleton(), t);
    let run = AgreementEvaluator::new(rep, rep).unwrap().evaluate_all().unwrap();
    let c = run.subsets[0].counts;
    assert_eq!(c.false_pos + c.false_neg + c.gray_b, 0);
    assert_eq!(c.true_pos, 1);
    assert_eq!(c.true_neg, 3);
    assert_eq!(c.gray_a, 2);
}
