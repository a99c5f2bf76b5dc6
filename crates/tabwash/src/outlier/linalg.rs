//! Dense linear algebra over small row-major matrices.

/// Row-major matrix: one inner vector per observation.
pub(crate) type Matrix = Vec<Vec<f64>>;

/// Center and scale every feature to zero mean and unit variance.
/// Constant features are centered only.
pub(crate) fn standardize(data: &Matrix) -> Matrix {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }
    let d = data[0].len();
    let mut out = data.clone();
    for j in 0..d {
        let mean = data.iter().map(|r| r[j]).sum::<f64>() / n as f64;
        let var = data.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        for row in out.iter_mut() {
            row[j] = if std > 0.0 { (row[j] - mean) / std } else { row[j] - mean };
        }
    }
    out
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Keep only the given feature positions of every row.
pub(crate) fn select_features(data: &Matrix, features: &[usize]) -> Matrix {
    data.iter()
        .map(|row| features.iter().map(|&j| row[j]).collect())
        .collect()
}

pub(crate) fn mean_of(data: &Matrix, rows: &[usize]) -> Vec<f64> {
    let d = data.first().map_or(0, Vec::len);
    let mut mean = vec![0.0; d];
    for &i in rows {
        for (m, x) in mean.iter_mut().zip(&data[i]) {
            *m += x;
        }
    }
    let count = rows.len().max(1) as f64;
    mean.iter_mut().for_each(|m| *m /= count);
    mean
}

/// Sample covariance of the given rows around `mean`.
pub(crate) fn covariance_of(data: &Matrix, rows: &[usize], mean: &[f64]) -> Matrix {
    let d = mean.len();
    let mut cov = vec![vec![0.0; d]; d];
    for &i in rows {
        let centered: Vec<f64> = data[i].iter().zip(mean).map(|(x, m)| x - m).collect();
        for a in 0..d {
            for b in a..d {
                cov[a][b] += centered[a] * centered[b];
            }
        }
    }
    let denom = rows.len().saturating_sub(1).max(1) as f64;
    for a in 0..d {
        for b in a..d {
            cov[a][b] /= denom;
            cov[b][a] = cov[a][b];
        }
    }
    cov
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
pub(crate) fn cholesky(a: &Matrix) -> Option<Matrix> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = a[i][i] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }
    Some(l)
}

/// A location and scatter estimate used for Mahalanobis distances.
#[derive(Debug, Clone)]
pub(crate) struct Gaussian {
    mean: Vec<f64>,
    chol: Matrix,
    log_det: f64,
}

impl Gaussian {
    /// Fit on `rows`, adding a ridge to the diagonal until the scatter factors.
    pub(crate) fn fit(data: &Matrix, rows: &[usize]) -> Self {
        let mean = mean_of(data, rows);
        let mut cov = covariance_of(data, rows, &mean);
        let d = mean.len();
        let trace: f64 = (0..d).map(|i| cov[i][i]).sum();
        let mut ridge = 1e-9_f64.max(1e-6 * trace / d.max(1) as f64);

        loop {
            if let Some(chol) = cholesky(&cov) {
                let log_det = 2.0 * chol.iter().enumerate().map(|(i, r)| r[i].ln()).sum::<f64>();
                return Self { mean, chol, log_det };
            }
            for (i, row) in cov.iter_mut().enumerate() {
                row[i] += ridge;
            }
            ridge *= 10.0;
        }
    }

    pub(crate) fn log_det(&self) -> f64 {
        self.log_det
    }

    /// Squared Mahalanobis distance of `x` from the fitted location.
    pub(crate) fn mahalanobis_sq(&self, x: &[f64]) -> f64 {
        // Forward substitution solves L y = x - mean
        let d = self.mean.len();
        let mut y = vec![0.0; d];
        for i in 0..d {
            let sum: f64 = (0..i).map(|k| self.chol[i][k] * y[k]).sum();
            y[i] = (x[i] - self.mean[i] - sum) / self.chol[i][i];
        }
        y.iter().map(|v| v * v).sum()
    }
}

/// Eigen decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns eigenvalues in descending order with the matching unit
/// eigenvectors.
pub(crate) fn symmetric_eigen(matrix: &Matrix) -> Vec<(f64, Vec<f64>)> {
    let n = matrix.len();
    let mut a = matrix.clone();
    let mut v: Matrix = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for _ in 0..100 {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off < 1e-20 {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q].abs() < 1e-300 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut pairs: Vec<(f64, Vec<f64>)> = (0..n)
        .map(|j| (a[j][j], v.iter().map(|row| row[j]).collect()))
        .collect();
    pairs.sort_by(|x, y| y.0.total_cmp(&x.0));
    pairs
}
