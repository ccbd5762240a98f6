// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Weighted Sampling
//
// Inverse-CDF walk over a probability vector, shared by the softmax and
// complement-explore strategies.

use rand::Rng;

/// Pick an index from `weights` (non-negative, summing to roughly 1) using the
/// unit draw `r` in `[0, 1)`.
///
/// Each weight is subtracted from `r` in order; the first index at which the
/// remainder drops to `<= 0` wins. Floating-point drift that leaves the
/// remainder positive after the last weight falls back to the last index.
/// Returns `None` only for an empty slice.
pub fn index_by_random(weights: &[f64], r: f64) -> Option<usize> {
    let last = weights.len().checked_sub(1)?;
    let mut remainder = r;
    for (i, w) in weights.iter().enumerate() {
        remainder -= w;
        if remainder <= 0.0 {
            return Some(i);
        }
    }
    Some(last)
}

/// Draw a unit random number and sample `weights` with it.
pub fn sample_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let r: f64 = rng.gen();
    index_by_random(weights, r)
}

/// Normalize raw non-negative scores into a probability vector.
///
/// Returns `None` when the total is not a positive finite number.
pub fn normalize(scores: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = scores.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some(scores.iter().map(|s| s / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const QUARTERS: [f64; 4] = [0.25, 0.25, 0.25, 0.25];

    #[test]
    fn test_uniform_quarters() {
        assert_eq!(index_by_random(&QUARTERS, 0.6), Some(2));
        assert_eq!(index_by_random(&QUARTERS, 0.99), Some(3));
        assert_eq!(index_by_random(&QUARTERS, 0.1), Some(0));
    }

    #[test]
    fn test_boundary_belongs_to_lower_index() {
        // Remainder hits exactly zero on the first weight.
        assert_eq!(index_by_random(&QUARTERS, 0.25), Some(0));
        assert_eq!(index_by_random(&[0.5, 0.5], 0.5), Some(0));
    }

    #[test]
    fn test_drift_clamps_to_last_index() {
        // Weights sum short of r.
        let weights = [0.3, 0.3, 0.3];
        assert_eq!(index_by_random(&weights, 0.999), Some(2));
        let weights = [0.1 / 3.0; 3];
        assert_eq!(index_by_random(&weights, 0.5), Some(2));
    }

    #[test]
    fn test_empty_weights() {
        assert_eq!(index_by_random(&[], 0.5), None);
    }

    #[test]
    fn test_skewed_weights_frequency() {
        let weights = [0.1, 0.9];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 10_000;
        let hits = (0..n)
            .filter(|_| sample_weighted(&weights, &mut rng) == Some(1))
            .count();
        let freq = hits as f64 / n as f64;
        assert!((freq - 0.9).abs() < 0.03, "frequency {freq}");
    }

    #[test]
    fn test_normalize() {
        let p = normalize(&[1.0, 3.0]).unwrap();
        assert!((p[0] - 0.25).abs() < f64::EPSILON);
        assert!((p[1] - 0.75).abs() < f64::EPSILON);
        assert!(normalize(&[0.0, 0.0]).is_none());
        assert!(normalize(&[]).is_none());
    }
}
