//! Covariance based scorers: minimum covariance determinant and PCA.

use super::linalg::{covariance_of, dot, mean_of, symmetric_eigen, Gaussian, Matrix};
use crate::stats::sample_positions;

const MAX_C_STEPS: usize = 30;

/// Squared Mahalanobis distance under a FastMCD robust estimate.
///
/// Each trial starts from a random half-sample and applies concentration
/// steps until the subset is stable. The subset with the smallest scatter
/// determinant wins.
pub(crate) fn mcd_scores(data: &Matrix, trials: usize, rng: &mut fastrand::Rng) -> Vec<f64> {
    let n = data.len();
    let p = data.first().map_or(0, Vec::len);
    let all: Vec<usize> = (0..n).collect();
    if n <= p + 1 {
        let fit = Gaussian::fit(data, &all);
        return data.iter().map(|x| fit.mahalanobis_sq(x)).collect();
    }
    let h = ((n + p + 1) / 2).min(n);

    let mut best: Option<Gaussian> = None;
    for _ in 0..trials.max(1) {
        let mut subset = sample_positions(n, h, rng);
        subset.sort_unstable();
        let mut fit = Gaussian::fit(data, &subset);
        for _ in 0..MAX_C_STEPS {
            let mut ranked: Vec<(usize, f64)> =
                all.iter().map(|&i| (i, fit.mahalanobis_sq(&data[i]))).collect();
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            let mut next: Vec<usize> = ranked[..h].iter().map(|&(i, _)| i).collect();
            next.sort_unstable();
            if next == subset {
                break;
            }
            subset = next;
            fit = Gaussian::fit(data, &subset);
        }
        if best.as_ref().is_none_or(|b| fit.log_det() < b.log_det()) {
            best = Some(fit);
        }
    }

    let fit = best.unwrap_or_else(|| Gaussian::fit(data, &all));
    data.iter().map(|x| fit.mahalanobis_sq(x)).collect()
}

/// Sum of squared projections on every principal axis, each weighted by
/// the inverse of its variance.
pub(crate) fn pca_scores(data: &Matrix) -> Vec<f64> {
    let all: Vec<usize> = (0..data.len()).collect();
    let mean = mean_of(data, &all);
    let components = symmetric_eigen(&covariance_of(data, &all, &mean));
    let largest = components.first().map_or(0.0, |c| c.0);
    let kept: Vec<&(f64, Vec<f64>)> = components
        .iter()
        .filter(|(variance, _)| *variance > largest * 1e-10 && *variance > 0.0)
        .collect();

    data.iter()
        .map(|x| {
            let centered: Vec<f64> = x.iter().zip(&mean).map(|(v, m)| v - m).collect();
            kept.iter()
                .map(|(variance, axis)| dot(&centered, axis).powi(2) / variance)
                .sum()
        })
        .collect()
}
