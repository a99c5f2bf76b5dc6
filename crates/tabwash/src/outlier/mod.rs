//! Outlier detection.
//!
//! Ten unsupervised scorers share one standardized feature matrix. The
//! ensemble averages their min-max normalized scores and ranks rows by the
//! result.

mod cluster;
mod covariance;
mod forest;
mod histogram;
mod linalg;
mod neighbors;
mod svm;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Column, Dataset, SemanticType, Value};
use crate::error::{Result, WashError};
use crate::stats::NumericSummary;

use linalg::Matrix;

/// Lowest and highest contamination an estimate may propose.
pub const CONTAMINATION_BOUNDS: (f64, f64) = (0.01, 0.5);

/// Name of the score column added to ranked datasets.
pub const SCORE_COLUMN: &str = "anomaly_score";

/// Name of the flag column added to ranked datasets.
pub const FLAG_COLUMN: &str = "is_outlier";

/// Supported detection algorithms, in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierAlgorithm {
    IsolationForest,
    Cblof,
    Mcd,
    Pca,
    Abod,
    Hbos,
    Knn,
    Lof,
    FeatureBagging,
    OneClassSvm,
}

impl OutlierAlgorithm {
    /// The full catalogue; positions are the indices accepted by `from_index`.
    pub const ALL: [OutlierAlgorithm; 10] = [
        OutlierAlgorithm::IsolationForest,
        OutlierAlgorithm::Cblof,
        OutlierAlgorithm::Mcd,
        OutlierAlgorithm::Pca,
        OutlierAlgorithm::Abod,
        OutlierAlgorithm::Hbos,
        OutlierAlgorithm::Knn,
        OutlierAlgorithm::Lof,
        OutlierAlgorithm::FeatureBagging,
        OutlierAlgorithm::OneClassSvm,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Resolve a list of catalogue indices.
    pub fn resolve(indices: &[usize]) -> Result<Vec<Self>> {
        if indices.is_empty() {
            return Err(WashError::InvalidArgument(
                "select at least one outlier algorithm".to_string(),
            ));
        }
        indices
            .iter()
            .map(|&i| {
                Self::from_index(i).ok_or_else(|| {
                    WashError::InvalidArgument(format!(
                        "algorithm index {} is out of range 0..{}",
                        i,
                        Self::ALL.len()
                    ))
                })
            })
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierAlgorithm::IsolationForest => "iforest",
            OutlierAlgorithm::Cblof => "cblof",
            OutlierAlgorithm::Mcd => "mcd",
            OutlierAlgorithm::Pca => "pca",
            OutlierAlgorithm::Abod => "abod",
            OutlierAlgorithm::Hbos => "hbos",
            OutlierAlgorithm::Knn => "knn",
            OutlierAlgorithm::Lof => "lof",
            OutlierAlgorithm::FeatureBagging => "feature_bagging",
            OutlierAlgorithm::OneClassSvm => "ocsvm",
        }
    }

    /// Human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            OutlierAlgorithm::IsolationForest => "Isolation Forest",
            OutlierAlgorithm::Cblof => "Cluster-based Local Outlier Factor",
            OutlierAlgorithm::Mcd => "Minimum Covariance Determinant",
            OutlierAlgorithm::Pca => "Principal Component Analysis",
            OutlierAlgorithm::Abod => "Angle-based Outlier Detector",
            OutlierAlgorithm::Hbos => "Histogram-based Outlier Detection",
            OutlierAlgorithm::Knn => "K-Nearest-Neighbors",
            OutlierAlgorithm::Lof => "Local Outlier Factor",
            OutlierAlgorithm::FeatureBagging => "Feature Bagging",
            OutlierAlgorithm::OneClassSvm => "One-class SVM",
        }
    }

    fn score(&self, features: &Matrix, rng: &mut fastrand::Rng) -> Vec<f64> {
        match self {
            OutlierAlgorithm::IsolationForest => forest::isolation_forest_scores(features, 100, 256, rng),
            OutlierAlgorithm::Cblof => cluster::cblof_scores(features, 8, 0.9, 5.0, rng),
            OutlierAlgorithm::Mcd => covariance::mcd_scores(features, 10, rng),
            OutlierAlgorithm::Pca => covariance::pca_scores(features),
            OutlierAlgorithm::Abod => neighbors::abod_scores(features, 10),
            OutlierAlgorithm::Hbos => histogram::hbos_scores(features, 10, 0.1),
            OutlierAlgorithm::Knn => neighbors::knn_scores(features, 5),
            OutlierAlgorithm::Lof => neighbors::lof_scores(features, 20),
            OutlierAlgorithm::FeatureBagging => {
                neighbors::feature_bagging_scores(features, 20, 10, rng)
            }
            OutlierAlgorithm::OneClassSvm => svm::ocsvm_scores(features, 0.5, 1000, rng),
        }
    }
}

impl fmt::Display for OutlierAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for OutlierAlgorithm {
    type Err = WashError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|a| a.as_str() == wanted || a.display_name().eq_ignore_ascii_case(&wanted))
            .copied()
            .ok_or_else(|| WashError::InvalidArgument(format!("unknown outlier algorithm '{}'", s)))
    }
}

/// Result of an outlier run.
#[derive(Debug, Clone)]
pub struct OutlierReport {
    /// Rows sorted by descending ensemble score, with score and flag columns.
    pub ranked: Dataset,
    /// Ensemble score of every row, in the input row order.
    pub scores: Vec<f64>,
    /// Raw scores per algorithm, in the input row order.
    pub algorithm_scores: IndexMap<OutlierAlgorithm, Vec<f64>>,
    /// Labels of the rows flagged as outliers, most anomalous first.
    pub outliers: Vec<usize>,
    pub contamination: f64,
}

impl OutlierReport {
    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }
}

/// Scores and ranks rows by how anomalous they are.
pub trait OutlierDetector: Send + Sync {
    /// Rank the rows of `dataset` using the numeric columns among `columns`.
    fn identify_outliers(
        &self,
        dataset: &Dataset,
        columns: &[String],
        contamination: f64,
        algorithms: &[OutlierAlgorithm],
    ) -> Result<OutlierReport>;

    /// Propose a contamination fraction for `dataset`.
    fn estimate_contamination(&self, dataset: &Dataset) -> Result<f64>;
}

/// Default detector: the mean of normalized scores across the selected algorithms.
#[derive(Debug, Clone, Default)]
pub struct EnsembleDetector {
    seed: Option<u64>,
}

impl EnsembleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every randomized algorithm reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

impl OutlierDetector for EnsembleDetector {
    fn identify_outliers(
        &self,
        dataset: &Dataset,
        columns: &[String],
        contamination: f64,
        algorithms: &[OutlierAlgorithm],
    ) -> Result<OutlierReport> {
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(WashError::InvalidArgument(format!(
                "contamination {} must be in (0, 0.5]",
                contamination
            )));
        }
        if algorithms.is_empty() {
            return Err(WashError::InvalidArgument(
                "select at least one outlier algorithm".to_string(),
            ));
        }
        let rows = dataset.row_count();
        if rows < 2 {
            return Err(WashError::InvalidArgument(format!(
                "outlier detection needs at least 2 rows, found {}",
                rows
            )));
        }

        let features = linalg::standardize(&feature_matrix(dataset, columns)?);
        let mut rng = self.rng();

        let mut algorithm_scores = IndexMap::new();
        let mut ensemble = vec![0.0; rows];
        for algorithm in algorithms {
            if algorithm_scores.contains_key(algorithm) {
                continue;
            }
            debug!(algorithm = %algorithm, rows, "scoring rows");
            let raw = algorithm.score(&features, &mut rng);
            for (total, s) in ensemble.iter_mut().zip(min_max(&raw)) {
                *total += s;
            }
            algorithm_scores.insert(*algorithm, raw);
        }
        let used = algorithm_scores.len() as f64;
        ensemble.iter_mut().for_each(|s| *s /= used);

        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by(|a, b| ensemble[*b].total_cmp(&ensemble[*a]).then(a.cmp(b)));
        let flagged = ((contamination * rows as f64).ceil() as usize).min(rows);

        let ranked = dataset.take_rows(&order);
        let ranked = ranked.with_column(Column::new(
            SCORE_COLUMN,
            order.iter().map(|&i| Value::Float(ensemble[i])).collect(),
            SemanticType::Float,
        ))?;
        let ranked = ranked.with_column(Column::new(
            FLAG_COLUMN,
            (0..rows).map(|rank| Value::Boolean(rank < flagged)).collect(),
            SemanticType::Boolean,
        ))?;
        let outliers = order[..flagged].iter().map(|&i| dataset.index()[i]).collect();

        Ok(OutlierReport {
            ranked,
            scores: ensemble,
            algorithm_scores,
            outliers,
            contamination,
        })
    }

    fn estimate_contamination(&self, dataset: &Dataset) -> Result<f64> {
        let numeric: Vec<&Column> = dataset
            .columns()
            .iter()
            .filter(|c| c.has_numeric_view())
            .collect();
        if numeric.is_empty() || dataset.row_count() == 0 {
            return Err(WashError::InvalidArgument(
                "contamination needs at least one numeric column".to_string(),
            ));
        }

        let fenced: Vec<(Vec<Option<f64>>, Option<NumericSummary>)> = numeric
            .iter()
            .map(|c| {
                let values = c.numeric_values();
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                (values, NumericSummary::from_values(&present))
            })
            .collect();

        let outside = (0..dataset.row_count())
            .filter(|&row| {
                fenced.iter().any(|(values, summary)| match (values[row], summary) {
                    (Some(v), Some(s)) => s.is_outlier_iqr(v, 1.5),
                    _ => false,
                })
            })
            .count();

        let (lo, hi) = CONTAMINATION_BOUNDS;
        let fraction = outside as f64 / dataset.row_count() as f64;
        debug!(outside, fraction, "estimated contamination");
        Ok(fraction.clamp(lo, hi))
    }
}

/// Numeric feature matrix over `columns`; rows with missing cells are rejected.
fn feature_matrix(dataset: &Dataset, columns: &[String]) -> Result<Matrix> {
    let mut numeric = Vec::new();
    for name in columns {
        let column = dataset
            .column(name)
            .ok_or_else(|| WashError::UnknownColumn(name.clone()))?;
        if column.has_numeric_view() {
            numeric.push(column);
        }
    }
    if numeric.is_empty() {
        return Err(WashError::InvalidArgument(
            "outlier detection needs at least one numeric column".to_string(),
        ));
    }
    let missing: usize = numeric.iter().map(|c| c.null_count()).sum();
    if missing > 0 {
        return Err(WashError::MissingData { count: missing });
    }

    let values: Vec<Vec<Option<f64>>> = numeric.iter().map(|c| c.numeric_values()).collect();
    Ok((0..dataset.row_count())
        .map(|row| values.iter().map(|v| v[row].unwrap_or(0.0)).collect())
        .collect())
}

fn min_max(scores: &[f64]) -> Vec<f64> {
    let finite = scores.iter().copied().filter(|s| s.is_finite());
    let lo = finite.clone().fold(f64::INFINITY, f64::min);
    let hi = finite.fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        return vec![0.0; scores.len()];
    }
    scores
        .iter()
        .map(|s| {
            if s.is_finite() {
                (s - lo) / (hi - lo)
            } else if *s > 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}
