//! Isolation forest.

use super::linalg::Matrix;
use crate::stats::sample_positions;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful search in a binary search tree.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn build(data: &Matrix, rows: Vec<usize>, depth: usize, max_depth: usize, rng: &mut fastrand::Rng) -> Node {
    if depth >= max_depth || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let d = data[rows[0]].len();
    let splittable: Vec<(usize, f64, f64)> = (0..d)
        .filter_map(|j| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(data[i][j]), hi.max(data[i][j]))
            });
            (lo < hi).then_some((j, lo, hi))
        })
        .collect();
    if splittable.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = splittable[rng.usize(..splittable.len())];
    let threshold = lo + rng.f64() * (hi - lo);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&i| data[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build(data, left, depth + 1, max_depth, rng)),
        right: Box::new(build(data, right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, x: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if x[*feature] < *threshold {
                path_length(left, x, depth + 1)
            } else {
                path_length(right, x, depth + 1)
            }
        }
    }
}

/// Anomaly score `2^(-E[h(x)] / c(psi))`; values near 1 are easy to isolate.
pub(crate) fn isolation_forest_scores(
    data: &Matrix,
    trees: usize,
    subsample: usize,
    rng: &mut fastrand::Rng,
) -> Vec<f64> {
    let n = data.len();
    let psi = subsample.min(n);
    if psi < 2 {
        return vec![0.0; n];
    }
    let max_depth = (psi as f64).log2().ceil() as usize;

    let forest: Vec<Node> = (0..trees)
        .map(|_| build(data, sample_positions(n, psi, rng), 0, max_depth, rng))
        .collect();

    let normalizer = average_path_length(psi);
    data.iter()
        .map(|x| {
            let mean_path =
                forest.iter().map(|t| path_length(t, x, 0)).sum::<f64>() / forest.len().max(1) as f64;
            2f64.powf(-mean_path / normalizer)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.244).abs() < 1e-2);
    }

    #[test]
    fn test_isolated_point_scores_highest() {
        let mut data: Matrix = (0..50).map(|i| vec![(i % 10) as f64, (i / 10) as f64]).collect();
        data.push(vec![100.0, 100.0]);
        let scores = isolation_forest_scores(&data, 100, 256, &mut fastrand::Rng::with_seed(7));
        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(scores[50], max);
        assert!(scores[50] > 0.6);
    }

    #[test]
    fn test_tiny_input() {
        let scores = isolation_forest_scores(&vec![vec![1.0]], 10, 256, &mut fastrand::Rng::with_seed(1));
        assert_eq!(scores, vec![0.0]);
    }
}
