//! Missing value repair.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Column, Dataset, SemanticType, Value, ValueKey};
use crate::error::{Result, WashError};
use crate::stats::NumericSummary;

/// How missing cells are repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Drop every row that has a missing cell.
    Remove,
    /// Fill numeric columns with their mean.
    Mean,
    /// Fill numeric columns with their median.
    Median,
    /// Fill every column with its most frequent value.
    Mode,
    /// Fill numeric and boolean columns with zero / false.
    Zero,
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingStrategy::Remove => "remove",
            MissingStrategy::Mean => "mean",
            MissingStrategy::Median => "median",
            MissingStrategy::Mode => "mode",
            MissingStrategy::Zero => "zero",
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingStrategy {
    type Err = WashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" | "drop" => Ok(MissingStrategy::Remove),
            "mean" => Ok(MissingStrategy::Mean),
            "median" => Ok(MissingStrategy::Median),
            "mode" | "most_frequent" => Ok(MissingStrategy::Mode),
            "zero" | "constant" => Ok(MissingStrategy::Zero),
            other => Err(WashError::InvalidArgument(format!(
                "unknown missing value strategy '{}'",
                other
            ))),
        }
    }
}

/// Repairs missing values in a dataset.
pub trait MissingValueHandler: Send + Sync {
    /// Return a copy of `dataset` with cells matching `markers` treated as
    /// missing and every missing cell repaired according to `strategy`.
    fn handle_missing(
        &self,
        dataset: &Dataset,
        strategy: MissingStrategy,
        markers: &[String],
    ) -> Result<Dataset>;
}

/// Default missing value handler using simple per-column fills.
#[derive(Debug, Clone, Copy, Default)]
pub struct Imputer;

impl Imputer {
    pub fn new() -> Self {
        Self
    }
}

impl MissingValueHandler for Imputer {
    fn handle_missing(
        &self,
        dataset: &Dataset,
        strategy: MissingStrategy,
        markers: &[String],
    ) -> Result<Dataset> {
        let marked = mark_missing(dataset, markers)?;
        debug!(
            strategy = %strategy,
            missing = marked.missing_count(),
            "repairing missing values"
        );

        if strategy == MissingStrategy::Remove {
            let keep: Vec<usize> = (0..marked.row_count())
                .filter(|&pos| marked.columns().iter().all(|c| !c.values[pos].is_null()))
                .collect();
            return Ok(marked.take_rows(&keep));
        }

        let columns: Vec<Column> = marked
            .columns()
            .iter()
            .map(|c| fill_column(c, strategy))
            .collect();
        Dataset::with_index(columns, marked.index().to_vec())
    }
}

/// Replace cells whose text form equals one of the markers with nulls.
fn mark_missing(dataset: &Dataset, markers: &[String]) -> Result<Dataset> {
    if markers.is_empty() {
        return Ok(dataset.clone());
    }
    let columns = dataset
        .columns()
        .iter()
        .map(|c| {
            let values = c
                .values
                .iter()
                .map(|v| {
                    if !v.is_null() && markers.iter().any(|m| *m == v.render()) {
                        Value::Null
                    } else {
                        v.clone()
                    }
                })
                .collect();
            Column::new(c.name.clone(), values, c.dtype)
        })
        .collect();
    Dataset::with_index(columns, dataset.index().to_vec())
}

fn fill_column(column: &Column, strategy: MissingStrategy) -> Column {
    if column.null_count() == 0 || column.null_count() == column.len() {
        return column.clone();
    }
    let numeric = matches!(column.dtype, SemanticType::Integer | SemanticType::Float)
        && column.is_numeric();

    match strategy {
        MissingStrategy::Mean | MissingStrategy::Median if numeric => {
            let values: Vec<f64> = column.numeric_values().into_iter().flatten().collect();
            match NumericSummary::from_values(&values) {
                Some(summary) => {
                    let fill = if strategy == MissingStrategy::Mean {
                        summary.mean
                    } else {
                        summary.median
                    };
                    fill_numeric(column, fill)
                }
                None => column.clone(),
            }
        }
        MissingStrategy::Mean | MissingStrategy::Median => {
            // Booleans fall back to their mode; text has no central value
            if column.dtype == SemanticType::Boolean {
                fill_with(column, mode(column))
            } else {
                column.clone()
            }
        }
        MissingStrategy::Mode => fill_with(column, mode(column)),
        MissingStrategy::Zero => match column.dtype {
            SemanticType::Integer if numeric => fill_numeric(column, 0.0),
            SemanticType::Float if numeric => fill_numeric(column, 0.0),
            SemanticType::Boolean => fill_with(column, Some(Value::Boolean(false))),
            _ => column.clone(),
        },
        MissingStrategy::Remove => column.clone(),
    }
}

/// Fill a numeric column, widening Integer cells to Float when the fill is fractional.
fn fill_numeric(column: &Column, fill: f64) -> Column {
    if column.dtype == SemanticType::Integer && fill.fract() == 0.0 {
        return fill_with(column, Some(Value::Integer(fill as i64)));
    }
    let values = column
        .values
        .iter()
        .map(|v| match v {
            Value::Null => Value::Float(fill),
            other => other.as_f64().map(Value::Float).unwrap_or_else(|| other.clone()),
        })
        .collect();
    Column::new(column.name.clone(), values, SemanticType::Float)
}

fn fill_with(column: &Column, fill: Option<Value>) -> Column {
    let Some(fill) = fill else {
        return column.clone();
    };
    let values = column
        .values
        .iter()
        .map(|v| if v.is_null() { fill.clone() } else { v.clone() })
        .collect();
    Column::new(column.name.clone(), values, column.dtype)
}

/// Most frequent non-null value; ties go to the value seen first.
fn mode(column: &Column) -> Option<Value> {
    let mut counts: IndexMap<ValueKey, (usize, &Value)> = IndexMap::new();
    for v in column.values.iter().filter(|v| !v.is_null()) {
        counts.entry(v.key()).or_insert((0, v)).0 += 1;
    }
    let mut best: Option<(usize, &Value)> = None;
    for (count, value) in counts.values() {
        if best.map_or(true, |(c, _)| *count > c) {
            best = Some((*count, value));
        }
    }
    best.map(|(_, v)| v.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "age",
                vec![Value::Integer(10), Value::Null, Value::Integer(20), Value::Integer(-1)],
                SemanticType::Integer,
            ),
            Column::new(
                "city",
                vec![Value::from("a"), Value::from("b"), Value::Null, Value::from("b")],
                SemanticType::Category,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("drop".parse::<MissingStrategy>().unwrap(), MissingStrategy::Remove);
        assert_eq!(
            "most_frequent".parse::<MissingStrategy>().unwrap(),
            MissingStrategy::Mode
        );
        assert!("knn".parse::<MissingStrategy>().is_err());
    }

    #[test]
    fn test_remove_drops_incomplete_rows() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Remove, &[])
            .unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.index(), &[0, 3]);
        assert!(!out.has_missing());
    }

    #[test]
    fn test_markers_are_treated_as_missing() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Remove, &["-1".to_string()])
            .unwrap();
        assert_eq!(out.index(), &[0]);
    }

    #[test]
    fn test_mean_widens_integers() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Mean, &[])
            .unwrap();
        let age = out.column("age").unwrap();
        assert_eq!(age.dtype, SemanticType::Float);
        assert!((age.values[1].as_f64().unwrap() - 29.0 / 3.0).abs() < 1e-9);
        assert_eq!(age.values[0], Value::Float(10.0));
        // Text columns are left alone
        assert_eq!(out.column("city").unwrap().null_count(), 1);
    }

    #[test]
    fn test_median_keeps_whole_integers() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Median, &[])
            .unwrap();
        let age = out.column("age").unwrap();
        assert_eq!(age.dtype, SemanticType::Integer);
        assert_eq!(age.values[1], Value::Integer(10));
    }

    #[test]
    fn test_mode_fills_every_column() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Mode, &[])
            .unwrap();
        assert!(!out.has_missing());
        assert_eq!(out.column("city").unwrap().values[2], Value::from("b"));
        // All ages are unique, so the first one wins
        assert_eq!(out.column("age").unwrap().values[1], Value::Integer(10));
    }

    #[test]
    fn test_zero_fill() {
        let out = Imputer
            .handle_missing(&dataset(), MissingStrategy::Zero, &[])
            .unwrap();
        assert_eq!(out.column("age").unwrap().values[1], Value::Integer(0));
        assert_eq!(out.column("city").unwrap().null_count(), 1);
    }
}
