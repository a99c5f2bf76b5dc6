//! Sampling-based semantic type inference.
//!
//! A column is classified from its cardinality first. Columns with two
//! distinct values are booleans when numeric and categories otherwise,
//! columns with few distinct values are categories. Everything else is
//! decided by a vote over a random sample of the column's values.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Dataset, SemanticType, Value};
use crate::stats::sample_positions;

/// Vote slots in tie-breaking priority order.
const VOTE_ORDER: [SemanticType; 4] = [
    SemanticType::DateTime,
    SemanticType::Float,
    SemanticType::Integer,
    SemanticType::Object,
];

/// Longest text (in characters) that can still count as a date.
const MAX_DATE_LEN: usize = 10;

/// Tuning knobs for [`TypeInferencer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Fraction of values sampled for the vote.
    pub sample_fraction: f64,
    /// Columns with fewer distinct values than this are categories.
    pub category_threshold: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_fraction: 0.1,
            category_threshold: 10,
        }
    }
}

/// Per-type vote counts from one sampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Votes {
    pub datetime: usize,
    pub float: usize,
    pub integer: usize,
    pub object: usize,
}

impl Votes {
    fn add(&mut self, ty: SemanticType) {
        match ty {
            SemanticType::DateTime => self.datetime += 1,
            SemanticType::Float => self.float += 1,
            SemanticType::Integer => self.integer += 1,
            _ => self.object += 1,
        }
    }

    fn count(&self, ty: SemanticType) -> usize {
        match ty {
            SemanticType::DateTime => self.datetime,
            SemanticType::Float => self.float,
            SemanticType::Integer => self.integer,
            _ => self.object,
        }
    }

    /// The type with the most votes; ties go to the earliest type in
    /// DateTime, Float, Integer, Object order.
    pub fn winner(&self) -> SemanticType {
        let mut best = VOTE_ORDER[0];
        for ty in VOTE_ORDER.iter().skip(1) {
            if self.count(*ty) > self.count(best) {
                best = *ty;
            }
        }
        best
    }
}

/// Infers a [`SemanticType`] for columns of values.
#[derive(Debug, Clone, Default)]
pub struct TypeInferencer {
    config: InferenceConfig,
}

impl TypeInferencer {
    /// Create an inferencer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inferencer with custom settings.
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the type of a column.
    ///
    /// `values` must already be free of nulls. The random source only
    /// matters for high-cardinality columns, where it selects the sample.
    pub fn infer(&self, values: &[Value], rng: &mut fastrand::Rng) -> SemanticType {
        let distinct = values.iter().map(Value::key).collect::<HashSet<_>>().len();

        if distinct == 2 {
            return if values[0].converts_to_integer() {
                SemanticType::Boolean
            } else {
                SemanticType::Category
            };
        }
        if distinct < self.config.category_threshold {
            return SemanticType::Category;
        }

        let votes = self.vote(values, rng);
        let winner = votes.winner();
        debug!(
            distinct,
            datetime = votes.datetime,
            float = votes.float,
            integer = votes.integer,
            object = votes.object,
            winner = %winner,
            "sampled column type"
        );
        winner
    }

    /// Run the sampling vote over a column.
    pub fn vote(&self, values: &[Value], rng: &mut fastrand::Rng) -> Votes {
        let n = values.len();
        let k = self.sample_size(n);
        let mut votes = Votes::default();
        for position in sample_positions(n, k, rng) {
            votes.add(classify_value(&values[position]));
        }
        votes
    }

    /// Number of values sampled from a column of length `n`.
    pub fn sample_size(&self, n: usize) -> usize {
        let k = (self.config.sample_fraction * n as f64).floor() as usize;
        k.max(1).min(n)
    }

    /// Infer a type per column, aligned with the dataset's column order.
    ///
    /// Nulls are dropped from every column before inference.
    pub fn discover_types(&self, dataset: &Dataset, rng: &mut fastrand::Rng) -> Vec<SemanticType> {
        dataset
            .columns()
            .iter()
            .map(|column| {
                let values = column.non_null();
                let ty = self.infer(&values, rng);
                debug!(column = %column.name, inferred = %ty, "inferred column type");
                ty
            })
            .collect()
    }
}

/// Classify a single sampled value into one of the vote slots.
pub fn classify_value(value: &Value) -> SemanticType {
    match value {
        Value::Text(s) => {
            if looks_like_date(s) {
                SemanticType::DateTime
            } else {
                SemanticType::Object
            }
        }
        Value::Integer(_) | Value::Boolean(_) => SemanticType::Integer,
        Value::Float(f) if !f.is_finite() => SemanticType::Object,
        Value::Float(f) if f.fract() == 0.0 => SemanticType::Integer,
        Value::Float(_) => SemanticType::Float,
        Value::DateTime(_) => SemanticType::DateTime,
        Value::Null => SemanticType::Object,
    }
}

/// Whether text has date separators where `DD-MM-YYYY` or `YYYY-MM-DD`
/// style dates put them (`-` or `/`).
pub fn looks_like_date(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > MAX_DATE_LEN {
        return false;
    }
    let is_sep = |i: usize| matches!(chars.get(i), Some('-') | Some('/'));
    (is_sep(2) && is_sep(5)) || (is_sep(4) && is_sep(7))
}

/// Infer the type of a null-free column with default settings and a fresh
/// random source.
pub fn infer_column_type(values: &[Value]) -> SemanticType {
    TypeInferencer::new().infer(values, &mut fastrand::Rng::new())
}

/// Infer a type for every column of a dataset with default settings.
pub fn discover_type_heuristic(dataset: &Dataset) -> Vec<SemanticType> {
    TypeInferencer::new().discover_types(dataset, &mut fastrand::Rng::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: impl IntoIterator<Item = String>) -> Vec<Value> {
        values.into_iter().map(Value::Text).collect()
    }

    #[test]
    fn test_two_numeric_values_is_boolean() {
        let values = vec![Value::Integer(0), Value::Integer(1), Value::Integer(1)];
        assert_eq!(infer_column_type(&values), SemanticType::Boolean);

        let values = text(["1", "0", "0"].map(String::from));
        assert_eq!(infer_column_type(&values), SemanticType::Boolean);
    }

    #[test]
    fn test_two_text_values_is_category() {
        let values = text(["yes", "no", "yes"].map(String::from));
        assert_eq!(infer_column_type(&values), SemanticType::Category);
    }

    #[test]
    fn test_low_cardinality_is_category() {
        let values: Vec<Value> = (0..100).map(|i| Value::Float(i as f64 % 7.0 + 0.5)).collect();
        assert_eq!(infer_column_type(&values), SemanticType::Category);
    }

    #[test]
    fn test_single_value_is_category() {
        assert_eq!(infer_column_type(&[Value::Integer(3)]), SemanticType::Category);
        assert_eq!(infer_column_type(&[]), SemanticType::Category);
    }

    #[test]
    fn test_dates_win_vote() {
        let values = text((1..=100).map(|i| format!("2020-{:02}-{:02}", i % 12 + 1, i % 28 + 1)));
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(
            TypeInferencer::new().infer(&values, &mut rng),
            SemanticType::DateTime
        );
    }

    #[test]
    fn test_floats_win_vote() {
        let values: Vec<Value> = (1..=100).map(|i| Value::Float(i as f64 + 0.25)).collect();
        assert_eq!(infer_column_type(&values), SemanticType::Float);
    }

    #[test]
    fn test_whole_floats_vote_integer() {
        let values: Vec<Value> = (1..=100).map(|i| Value::Float(i as f64)).collect();
        assert_eq!(infer_column_type(&values), SemanticType::Integer);
    }

    #[test]
    fn test_free_text_is_object() {
        let values = text((0..50).map(|i| format!("customer number {}", i)));
        assert_eq!(infer_column_type(&values), SemanticType::Object);
    }

    #[test]
    fn test_looks_like_date() {
        assert!(looks_like_date("2020-01-01"));
        assert!(!looks_like_date("2020/1/01"));
        assert!(looks_like_date("01/31/2020"));
        assert!(looks_like_date("31-01-2020"));
        assert!(!looks_like_date("2020-01-01 10:00"));
        assert!(!looks_like_date("abc"));
        assert!(!looks_like_date(""));
    }

    #[test]
    fn test_tie_prefers_earlier_type() {
        let votes = Votes {
            datetime: 0,
            float: 3,
            integer: 3,
            object: 3,
        };
        assert_eq!(votes.winner(), SemanticType::Float);
        assert_eq!(Votes::default().winner(), SemanticType::DateTime);
    }

    #[test]
    fn test_sample_size() {
        let inferencer = TypeInferencer::new();
        assert_eq!(inferencer.sample_size(100), 10);
        assert_eq!(inferencer.sample_size(15), 1);
        assert_eq!(inferencer.sample_size(5), 1);
        assert_eq!(inferencer.sample_size(0), 0);
    }

    #[test]
    fn test_seeded_inference_is_reproducible() {
        let mut values = text((0..60).map(|i| format!("item {}", i)));
        values.extend((0..60).map(|i| Value::Float(i as f64 + 0.5)));
        let inferencer = TypeInferencer::new();
        let a = inferencer.vote(&values, &mut fastrand::Rng::with_seed(42));
        let b = inferencer.vote(&values, &mut fastrand::Rng::with_seed(42));
        assert_eq!(a, b);
    }
}
