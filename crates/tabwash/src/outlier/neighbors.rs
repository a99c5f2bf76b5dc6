//! Proximity based scorers: KNN distance, LOF and angle based detection.

use super::linalg::{distance, dot, select_features, Matrix};
use crate::stats::sample_positions;

/// The `k` nearest neighbours of every row as `(row, distance)` pairs,
/// closest first. Rows are computed one at a time so memory stays `O(n k)`.
pub(crate) fn nearest_neighbors(data: &Matrix, k: usize) -> Vec<Vec<(usize, f64)>> {
    let n = data.len();
    let k = k.min(n.saturating_sub(1));
    (0..n)
        .map(|i| {
            let mut others: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, distance(&data[i], &data[j])))
                .collect();
            if k < others.len() {
                others.select_nth_unstable_by(k, |a, b| a.1.total_cmp(&b.1));
                others.truncate(k);
            }
            others.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            others
        })
        .collect()
}

/// Distance to the `k`-th nearest neighbour.
pub(crate) fn knn_scores(data: &Matrix, k: usize) -> Vec<f64> {
    nearest_neighbors(data, k)
        .into_iter()
        .map(|nn| nn.last().map_or(0.0, |&(_, d)| d))
        .collect()
}

/// Local outlier factor with `k` neighbours.
pub(crate) fn lof_scores(data: &Matrix, k: usize) -> Vec<f64> {
    let neighbors = nearest_neighbors(data, k);
    let k_distance: Vec<f64> = neighbors
        .iter()
        .map(|nn| nn.last().map_or(0.0, |&(_, d)| d))
        .collect();

    let lrd: Vec<f64> = neighbors
        .iter()
        .map(|nn| {
            if nn.is_empty() {
                return 0.0;
            }
            let reach: f64 = nn.iter().map(|&(o, d)| d.max(k_distance[o])).sum();
            // Duplicated points have zero reachability; keep the density finite
            1.0 / (reach / nn.len() as f64 + 1e-10)
        })
        .collect();

    neighbors
        .iter()
        .enumerate()
        .map(|(i, nn)| {
            if nn.is_empty() || lrd[i] == 0.0 {
                return 1.0;
            }
            nn.iter().map(|&(o, _)| lrd[o]).sum::<f64>() / (nn.len() as f64 * lrd[i])
        })
        .collect()
}

/// Fast angle based outlier detection over the `k` nearest neighbours.
///
/// Points whose neighbours are seen under widely varying angles sit inside a
/// cluster; low variance means the point is outside. The variance is negated
/// so larger scores are more anomalous.
pub(crate) fn abod_scores(data: &Matrix, k: usize) -> Vec<f64> {
    let neighbors = nearest_neighbors(data, k);
    neighbors
        .iter()
        .enumerate()
        .map(|(i, nn)| {
            let a = &data[i];
            let mut factors = Vec::new();
            for (x, &(b, _)) in nn.iter().enumerate() {
                for &(c, _) in &nn[x + 1..] {
                    let ab: Vec<f64> = data[b].iter().zip(a).map(|(p, q)| p - q).collect();
                    let ac: Vec<f64> = data[c].iter().zip(a).map(|(p, q)| p - q).collect();
                    let ab_sq = dot(&ab, &ab);
                    let ac_sq = dot(&ac, &ac);
                    if ab_sq == 0.0 || ac_sq == 0.0 {
                        continue;
                    }
                    factors.push(dot(&ab, &ac) / (ab_sq * ac_sq));
                }
            }
            if factors.is_empty() {
                return 0.0;
            }
            let mean = factors.iter().sum::<f64>() / factors.len() as f64;
            let var = factors.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / factors.len() as f64;
            -var
        })
        .collect()
}

/// Average LOF over `estimators` random feature subsets.
///
/// With three or more features each subset keeps between half and all but
/// one of them; smaller inputs use every feature.
pub(crate) fn feature_bagging_scores(
    data: &Matrix,
    k: usize,
    estimators: usize,
    rng: &mut fastrand::Rng,
) -> Vec<f64> {
    let n = data.len();
    let d = data.first().map_or(0, Vec::len);
    let mut totals = vec![0.0; n];
    for _ in 0..estimators {
        let size = if d <= 2 {
            d
        } else {
            rng.usize((d / 2)..d)
        };
        let mut features = sample_positions(d, size.max(1), rng);
        features.sort_unstable();
        let subset = select_features(data, &features);
        for (total, score) in totals.iter_mut().zip(lof_scores(&subset, k)) {
            *total += score;
        }
    }
    totals.iter().map(|t| t / estimators.max(1) as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_outlier() -> Matrix {
        let mut data: Matrix = (0..10).map(|i| vec![i as f64 * 0.1, 0.0]).collect();
        data.push(vec![10.0, 10.0]);
        data
    }

    fn argmax(scores: &[f64]) -> usize {
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_nearest_neighbors_sorted() {
        let data = vec![vec![0.0], vec![1.0], vec![3.0], vec![7.0]];
        let nn = nearest_neighbors(&data, 2);
        assert_eq!(nn[0], vec![(1, 1.0), (2, 3.0)]);
        assert_eq!(nn[3], vec![(2, 4.0), (1, 6.0)]);
    }

    #[test]
    fn test_k_larger_than_data() {
        let data = vec![vec![0.0], vec![1.0]];
        assert_eq!(knn_scores(&data, 5), vec![1.0, 1.0]);
    }

    #[test]
    fn test_scorers_rank_isolated_point_highest() {
        let data = line_with_outlier();
        assert_eq!(argmax(&knn_scores(&data, 3)), 10);
        assert_eq!(argmax(&lof_scores(&data, 3)), 10);
        assert_eq!(argmax(&abod_scores(&data, 5)), 10);
    }

    #[test]
    fn test_feature_bagging_is_seeded() {
        let data = line_with_outlier();
        let a = feature_bagging_scores(&data, 3, 4, &mut fastrand::Rng::with_seed(3));
        let b = feature_bagging_scores(&data, 3, 4, &mut fastrand::Rng::with_seed(3));
        assert_eq!(a, b);
        assert_eq!(argmax(&a), 10);
    }

    #[test]
    fn test_lof_near_one_inside_uniform_cluster() {
        let data: Matrix = (0..20).map(|i| vec![i as f64]).collect();
        let scores = lof_scores(&data, 2);
        assert!((scores[10] - 1.0).abs() < 1e-6);
    }
}
