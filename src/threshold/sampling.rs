//! Seeded subset sampling: uniform without replacement over an in-memory
//! universe, or single-pass reservoir sampling over a stream.
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Deterministic generator for repeat `repeat` of a run seeded with `seed`.
pub fn subset_rng(seed: u64, repeat: usize) -> StdRng {
    // SplitMix64 finalizer decorrelates neighbouring repeat indices.
    let mut z = seed ^ (repeat as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

/// `k` distinct indices from `0..n`, ascending. `k` is capped at `n`.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, n: usize, k: usize) -> Vec<usize> {
    let mut picked = index::sample(rng, n, k.min(n)).into_vec();
    picked.sort_unstable();
    picked
}

/// Algorithm R reservoir keeping up to `capacity` items of a stream.
#[derive(Debug)]
pub struct Reservoir<T> {
    capacity: usize,
    seen: usize,
    items: Vec<(usize, T)>,
}

impl<T> Reservoir<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Offers the next stream item; each of the `seen` items so far is kept
    /// with probability `capacity / seen`.
    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        let ordinal = self.seen;
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push((ordinal, item));
        } else if self.capacity > 0 {
            let j = rng.gen_range(0..self.seen);
            if j < self.capacity {
                self.items[j] = (ordinal, item);
            }
        }
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kept items in stream order.
    pub fn into_sorted(mut self) -> Vec<T> {
        self.items.sort_unstable_by_key(|(ordinal, _)| *ordinal);
        self.items.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_repeat_give_same_subset() {
        let a = sample_indices(&mut subset_rng(7, 3), 100, 10);
        let b = sample_indices(&mut subset_rng(7, 3), 100, 10);
        let c = sample_indices(&mut subset_rng(7, 4), 100, 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn subset_size_is_capped_by_universe() {
        let picked = sample_indices(&mut subset_rng(1, 0), 5, 50);
        assert_eq!(picked, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn reservoir_keeps_everything_below_capacity() {
        let mut rng = subset_rng(0, 0);
        let mut reservoir = Reservoir::new(10);
        for i in 0..4 {
            reservoir.offer(i, &mut rng);
        }
        assert_eq!(reservoir.seen(), 4);
        assert_eq!(reservoir.into_sorted(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn reservoir_is_roughly_uniform() {
        let n = 20usize;
        let k = 5usize;
        let runs = 4000usize;
        let mut hits = vec![0usize; n];
        for run in 0..runs {
            let mut rng = subset_rng(99, run);
            let mut reservoir = Reservoir::new(k);
            for i in 0..n {
                reservoir.offer(i, &mut rng);
            }
            let kept = reservoir.into_sorted();
            assert_eq!(kept.len(), k);
            assert!(kept.windows(2).all(|w| w[0] < w[1]));
            for i in kept {
                hits[i] += 1;
            }
        }
        let expected = (runs * k) as f64 / n as f64;
        for (i, &h) in hits.iter().enumerate() {
            let rel = (h as f64 - expected).abs() / expected;
            assert!(rel < 0.15, "item {i} kept {h} times, expected ~{expected}");
        }
    }
}
