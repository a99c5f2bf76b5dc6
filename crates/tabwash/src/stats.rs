//! Descriptive statistics over numeric columns.

use serde::{Deserialize, Serialize};

/// Summary statistics for a set of numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
}

impl NumericSummary {
    /// Summarize the finite values of a slice. Returns None when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            std: variance.sqrt(),
            median: quantile(&sorted, 0.5),
            q1: quantile(&sorted, 0.25),
            q3: quantile(&sorted, 0.75),
        })
    }

    /// Calculate the interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Check if a value is an outlier using the IQR method.
    pub fn is_outlier_iqr(&self, value: f64, multiplier: f64) -> bool {
        let iqr = self.iqr();
        let lower = self.q1 - multiplier * iqr;
        let upper = self.q3 + multiplier * iqr;
        value < lower || value > upper
    }

    /// Calculate the z-score for a value.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

/// Linearly interpolated quantile of sorted values, `p` in `[0, 1]`.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

/// Draw `k` distinct positions from `0..n` (partial Fisher-Yates).
pub(crate) fn sample_positions(n: usize, k: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..n).collect();
    let k = k.min(n);
    for i in 0..k {
        let j = rng.usize(i..n);
        positions.swap(i, j);
    }
    positions.truncate(k);
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let s = NumericSummary::from_values(&[4.0, 1.0, 3.0, 2.0, f64::NAN]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.q3, 3.25);
        assert!((s.std - 1.118_033_988).abs() < 1e-6);
    }

    #[test]
    fn test_empty_summary() {
        assert!(NumericSummary::from_values(&[]).is_none());
        assert!(NumericSummary::from_values(&[f64::INFINITY]).is_none());
    }

    #[test]
    fn test_sample_positions_are_distinct() {
        let mut rng = fastrand::Rng::with_seed(1);
        let positions = sample_positions(50, 20, &mut rng);
        assert_eq!(positions.len(), 20);
        assert_eq!(positions.iter().collect::<std::collections::HashSet<_>>().len(), 20);
        assert!(positions.iter().all(|&p| p < 50));
        assert_eq!(sample_positions(3, 10, &mut rng).len(), 3);
    }

    #[test]
    fn test_iqr_outlier() {
        let s = NumericSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(!s.is_outlier_iqr(5.0, 1.5));
        assert!(s.is_outlier_iqr(100.0, 1.5));
        assert_eq!(s.z_score(s.mean), 0.0);
    }
}
