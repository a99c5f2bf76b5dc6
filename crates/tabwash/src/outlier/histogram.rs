//! Histogram based outlier score.

use super::linalg::Matrix;

/// HBOS: sum over features of `-ln(density + alpha)` using equal width bins.
/// Constant features contribute nothing.
pub(crate) fn hbos_scores(data: &Matrix, bins: usize, alpha: f64) -> Vec<f64> {
    let n = data.len();
    let d = data.first().map_or(0, Vec::len);
    let bins = bins.max(1);
    let mut scores = vec![0.0; n];

    for j in 0..d {
        let (lo, hi) = data.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r[j]), hi.max(r[j]))
        });
        if hi <= lo {
            continue;
        }
        let width = (hi - lo) / bins as f64;
        let bin_of = |x: f64| (((x - lo) / width) as usize).min(bins - 1);

        let mut counts = vec![0usize; bins];
        for row in data {
            counts[bin_of(row[j])] += 1;
        }
        let density: Vec<f64> = counts
            .iter()
            .map(|&c| c as f64 / (n as f64 * width))
            .collect();
        for (score, row) in scores.iter_mut().zip(data) {
            *score -= (density[bin_of(row[j])] + alpha).ln();
        }
    }
    scores
}
