//! Test fixtures and reference implementations for Strata development.
//!
//! Provides deterministic input volumes ([`ramp`], [`seeded_volume`]),
//! tolerance assertions, a central-difference gradient estimator, and
//! a brute-force [`reference`] pooling implementation written
//! independently of the production kernels.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod reference;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::Element;

/// `[1, 2, ..., len]` as elements.
pub fn ramp<T: Element>(len: usize) -> Vec<T> {
    (1..=len).map(T::from_count).collect()
}

/// Uniform values in `[-1, 1)` from a seeded ChaCha8 stream.
///
/// Same seed, same volume, on every platform.
pub fn seeded_volume<T: Element>(len: usize, seed: u64) -> Vec<T> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| T::from_real(rng.random_range(-1.0..1.0)))
        .collect()
}

/// Seeded volume quantised to `levels` distinct values so windows
/// contain exact ties.
pub fn seeded_volume_with_ties<T: Element>(len: usize, seed: u64, levels: u32) -> Vec<T> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| T::from_real(f64::from(rng.random_range(0..levels.max(1)))))
        .collect()
}

/// Assert element-wise `|a - b| <= tol * max(1, |a|, |b|)`.
#[track_caller]
pub fn assert_close<T: Element>(actual: &[T], expected: &[T], tol: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "length mismatch: {} vs {}",
        actual.len(),
        expected.len()
    );
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        let (a, e) = (a.as_f64(), e.as_f64());
        let scale = 1.0f64.max(a.abs()).max(e.abs());
        assert!(
            (a - e).abs() <= tol * scale,
            "element {i}: {a} vs {e} (tol {tol})"
        );
    }
}

/// Central-difference estimate of `d/dx_i sum(w * f(x))` for every `i`.
///
/// `f` maps an input volume to an output volume; `weights` has the
/// output's length. This is the quantity a backward pass with
/// `dzdy = weights` must produce.
pub fn numeric_gradient<F>(x: &[f64], weights: &[f64], eps: f64, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let objective = |input: &[f64]| -> f64 {
        f(input).iter().zip(weights).map(|(y, w)| y * w).sum()
    };
    let mut probe = x.to_vec();
    (0..x.len())
        .map(|i| {
            probe[i] = x[i] + eps;
            let up = objective(&probe);
            probe[i] = x[i] - eps;
            let down = objective(&probe);
            probe[i] = x[i];
            (up - down) / (2.0 * eps)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_starts_at_one() {
        let r: Vec<f32> = ramp(4);
        assert_eq!(r, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn seeded_volume_is_deterministic_and_bounded() {
        let a: Vec<f64> = seeded_volume(64, 3);
        let b: Vec<f64> = seeded_volume(64, 3);
        let c: Vec<f64> = seeded_volume(64, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn tied_volume_uses_requested_levels() {
        let v: Vec<f32> = seeded_volume_with_ties(200, 9, 3);
        assert!(v.iter().all(|&x| x == 0.0 || x == 1.0 || x == 2.0));
    }

    #[test]
    fn numeric_gradient_of_linear_map() {
        // f(x) = [2 x0 + x1], weights [3] -> grad = [6, 3].
        let g = numeric_gradient(&[0.5, -0.25], &[3.0], 1e-4, |x| vec![2.0 * x[0] + x[1]]);
        assert_close(&g, &[6.0, 3.0], 1e-8);
    }
}
