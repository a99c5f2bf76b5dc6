//! Cluster based local outlier factor on top of k-means.

use super::linalg::{distance, squared_distance, Matrix};
use crate::stats::sample_positions;

const MAX_ITERATIONS: usize = 100;

/// Lloyd's k-means seeded from `k` distinct rows. Returns centroids and
/// the cluster of every row; empty clusters are dropped.
pub(crate) fn kmeans(data: &Matrix, k: usize, rng: &mut fastrand::Rng) -> (Matrix, Vec<usize>) {
    let n = data.len();
    let mut centroids: Matrix = sample_positions(n, k.min(n), rng)
        .into_iter()
        .map(|i| data[i].clone())
        .collect();
    let mut labels = vec![0; n];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, row) in data.iter().enumerate() {
            let nearest = closest(&centroids, row);
            if nearest != labels[i] {
                labels[i] = nearest;
                changed = true;
            }
        }

        let d = centroids.first().map_or(0, Vec::len);
        let mut sums = vec![vec![0.0; d]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (row, &label) in data.iter().zip(&labels) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(row) {
                *s += x;
            }
        }
        for (c, (sum, count)) in sums.into_iter().zip(&counts).enumerate() {
            if *count > 0 {
                centroids[c] = sum.into_iter().map(|s| s / *count as f64).collect();
            }
        }
        if !changed {
            break;
        }
    }

    // Renumber so every remaining cluster owns at least one row
    let mut remap = vec![None; centroids.len()];
    let mut kept = Vec::new();
    for label in labels.iter_mut() {
        let new = *remap[*label].get_or_insert_with(|| {
            kept.push(centroids[*label].clone());
            kept.len() - 1
        });
        *label = new;
    }
    (kept, labels)
}

fn closest(centroids: &Matrix, row: &[f64]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|a, b| squared_distance(a.1, row).total_cmp(&squared_distance(b.1, row)))
        .map_or(0, |(c, _)| c)
}

/// CBLOF scores: distance to the own centroid for members of large
/// clusters, distance to the nearest large centroid otherwise.
///
/// Clusters sorted by size are split into large and small at the first
/// boundary where the large ones cover `alpha` of the rows or the size
/// ratio across the boundary reaches `beta`.
pub(crate) fn cblof_scores(
    data: &Matrix,
    clusters: usize,
    alpha: f64,
    beta: f64,
    rng: &mut fastrand::Rng,
) -> Vec<f64> {
    let n = data.len();
    let (centroids, labels) = kmeans(data, clusters, rng);

    let mut sizes = vec![0usize; centroids.len()];
    for &label in &labels {
        sizes[label] += 1;
    }
    let mut order: Vec<usize> = (0..centroids.len()).collect();
    order.sort_by(|a, b| sizes[*b].cmp(&sizes[*a]));

    let mut boundary = order.len();
    let mut covered = 0;
    for b in 0..order.len() {
        covered += sizes[order[b]];
        let by_alpha = covered as f64 >= alpha * n as f64;
        let by_beta = b + 1 < order.len()
            && sizes[order[b]] as f64 / sizes[order[b + 1]].max(1) as f64 >= beta;
        if by_alpha || by_beta {
            boundary = b + 1;
            break;
        }
    }
    let mut large = vec![false; centroids.len()];
    for &c in &order[..boundary] {
        large[c] = true;
    }

    data.iter()
        .zip(&labels)
        .map(|(row, &label)| {
            if large[label] {
                distance(row, &centroids[label])
            } else {
                centroids
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| large[*c])
                    .map(|(_, centroid)| distance(row, centroid))
                    .fold(f64::INFINITY, f64::min)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Matrix {
        let mut data = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.01;
            data.push(vec![0.0 + jitter, 0.0]);
            data.push(vec![5.0 + jitter, 5.0]);
        }
        data
    }

    #[test]
    fn test_kmeans_finds_blobs() {
        let data = two_blobs();
        let (centroids, labels) = kmeans(&data, 2, &mut fastrand::Rng::with_seed(11));
        assert!(centroids.len() <= 2);
        // Rows of the same blob share a cluster
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[1], labels[3]);
    }

    #[test]
    fn test_every_label_is_valid() {
        let data = two_blobs();
        let (centroids, labels) = kmeans(&data, 8, &mut fastrand::Rng::with_seed(5));
        assert!(labels.iter().all(|&l| l < centroids.len()));
    }

    #[test]
    fn test_cblof_flags_far_point() {
        let mut data = two_blobs();
        data.push(vec![20.0, -20.0]);
        let scores = cblof_scores(&data, 3, 0.9, 5.0, &mut fastrand::Rng::with_seed(2));
        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(scores[40], max);
        assert!(scores.iter().all(|s| s.is_finite()));
    }
}
