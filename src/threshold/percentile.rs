//! Percentiles with linear interpolation between order statistics.

/// Percentile `q` (in percent) of an ascending slice.
///
/// The rank is `q / 100 * (n - 1)`; values between two order statistics are
/// interpolated linearly. Returns `None` for an empty slice or `q` outside
/// `[0, 100]`.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sorts `values` in place and evaluates every percentile in `qs`.
pub fn percentiles(values: &mut [f64], qs: &[f64]) -> Option<Vec<f64>> {
    values.sort_by(f64::total_cmp);
    qs.iter().map(|&q| percentile_sorted(values, q)).collect()
}
