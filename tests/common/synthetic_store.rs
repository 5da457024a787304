use motion_agreement::types::{MotionObject, Skeleton};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Three-joint rest pose used by the hand-computed scenarios.
pub fn rest_pose() -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ]
}

/// Two-frame skeleton: the rest pose shifted by `dx` along x, then raised
/// by 0.5 along y in the second frame.
pub fn shifted_skeleton(id: &str, dx: f32) -> MotionObject {
    let shift = Vector3::new(dx, 0.0, 0.0);
    let lift = Vector3::new(0.0, 0.5, 0.0);
    let f0: Vec<Vector3<f32>> = rest_pose().into_iter().map(|j| j + shift).collect();
    let f1: Vec<Vector3<f32>> = f0.iter().map(|j| j + lift).collect();
    let skeleton = Skeleton::from_frames(&[f0, f1]).expect("consistent frames");
    MotionObject::skeleton(id, skeleton)
}

/// Skeleton x-shifts of the four-object scenario; the per-joint DTW distance
/// between objects k and l is 3 |dx_k - dx_l|.
pub const SCENARIO_SHIFTS: [f32; 4] = [0.0, 0.125, 1.0, 3.0];

/// Four skeletons with pairwise distances 0.375 3 9 2.625 8.625 6.
pub fn scenario_skeletons() -> Vec<MotionObject> {
    SCENARIO_SHIFTS
        .iter()
        .enumerate()
        .map(|(i, &dx)| shifted_skeleton(&format!("{}_7_0_2_0", i + 1), dx))
        .collect()
}

/// Embeddings matching [`scenario_skeletons`] by canonical id. Flat L2
/// distances: (0,1)=0.5, (0,3)=4.375, (1,3)=3.875, (2,3)=0.5.
pub fn scenario_embeddings() -> Vec<MotionObject> {
    let vectors = [
        [0.0, 0.0, 0.0],
        [0.5, 0.0, 0.0],
        [4.375, 0.5, 0.0],
        [4.375, 0.0, 0.0],
    ];
    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| MotionObject::embedding(format!("{}_7_0_2_1", i + 1), v.to_vec()))
        .collect()
}

/// Skeletons with random coordinates and lengths in `min_len..=max_len`.
pub fn random_skeletons(
    n: usize,
    joints: usize,
    min_len: usize,
    max_len: usize,
    seed: u64,
) -> Vec<MotionObject> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let frames = rng.gen_range(min_len..=max_len);
            let coords: Vec<f32> = (0..frames * joints * 3)
                .map(|_| rng.gen_range(-1.0f32..1.0))
                .collect();
            let skeleton = Skeleton::from_flat(joints, coords).expect("whole frames");
            MotionObject::skeleton(format!("{}_{}_0_{frames}", i + 1, i % 3), skeleton)
        })
        .collect()
}

/// 2D embeddings drawn from two isotropic Gaussians centred at `(0, 0)` and
/// `(separation, 0)`, alternating between them.
pub fn two_gaussians(n: usize, sigma: f64, separation: f64, seed: u64) -> Vec<MotionObject> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let cx = if i % 2 == 0 { 0.0 } else { separation };
            let (gx, gy) = gaussian_pair(&mut rng);
            let values = vec![(cx + sigma * gx) as f32, (sigma * gy) as f32];
            MotionObject::embedding(format!("{i}_{}_0_1_0", i % 2), values)
        })
        .collect()
}

/// Box-Muller transform.
fn gaussian_pair(rng: &mut StdRng) -> (f64, f64) {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f64::consts::PI * u2;
    (r * theta.cos(), r * theta.sin())
}
