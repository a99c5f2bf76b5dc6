//! One-class support vector machine with an RBF kernel.

use super::linalg::{squared_distance, Matrix};
use crate::stats::sample_positions;

const ITERATIONS: usize = 200;

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    (-gamma * squared_distance(a, b)).exp()
}

/// Project `alpha` onto `{0 <= a_i <= cap, sum a_i = 1}` by bisecting
/// on the shift `tau` in `clamp(a_i - tau, 0, cap)`.
fn project(alpha: &mut [f64], cap: f64) {
    let total = |tau: f64, alpha: &[f64]| -> f64 {
        alpha.iter().map(|a| (a - tau).clamp(0.0, cap)).sum()
    };
    let mut lo = alpha.iter().cloned().fold(f64::INFINITY, f64::min) - cap;
    let mut hi = alpha.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if total(mid, alpha) > 1.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let tau = 0.5 * (lo + hi);
    for a in alpha.iter_mut() {
        *a = (*a - tau).clamp(0.0, cap);
    }
}

/// Negated decision value `-sum a_i K(x_i, x)` of a one-class SVM.
///
/// The dual `min 1/2 a'Ka` over the capped simplex is solved by projected
/// gradient descent on at most `max_train` sampled rows.
pub(crate) fn ocsvm_scores(
    data: &Matrix,
    nu: f64,
    max_train: usize,
    rng: &mut fastrand::Rng,
) -> Vec<f64> {
    let n = data.len();
    let d = data.first().map_or(0, Vec::len).max(1);
    let gamma = 1.0 / d as f64;

    let train: Vec<usize> = if n > max_train {
        sample_positions(n, max_train, rng)
    } else {
        (0..n).collect()
    };
    let m = train.len();
    if m == 0 {
        return Vec::new();
    }
    // A cap below 1/m would leave the feasible set empty
    let cap = (1.0 / (nu * m as f64)).max(1.0 / m as f64);

    let kernel: Matrix = train
        .iter()
        .map(|&i| train.iter().map(|&j| rbf(&data[i], &data[j], gamma)).collect())
        .collect();
    let lipschitz = kernel
        .iter()
        .map(|row| row.iter().sum::<f64>())
        .fold(0.0, f64::max)
        .max(1e-12);
    let step = 1.0 / lipschitz;

    let mut alpha = vec![1.0 / m as f64; m];
    for _ in 0..ITERATIONS {
        let gradient: Vec<f64> = kernel
            .iter()
            .map(|row| row.iter().zip(&alpha).map(|(k, a)| k * a).sum())
            .collect();
        for (a, g) in alpha.iter_mut().zip(&gradient) {
            *a -= step * g;
        }
        project(&mut alpha, cap);
    }

    let support: Vec<(usize, f64)> = train
        .iter()
        .zip(&alpha)
        .filter(|(_, a)| **a > 1e-12)
        .map(|(&i, &a)| (i, a))
        .collect();

    data.iter()
        .map(|x| -support.iter().map(|&(i, a)| a * rbf(&data[i], x, gamma)).sum::<f64>())
        .collect()
}
