//! Column scaling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Column, Dataset, SemanticType, Value};
use crate::error::{Result, WashError};
use crate::stats::NumericSummary;

/// Scaling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeStrategy {
    /// Map onto a target range.
    MinMax,
    /// Subtract the mean, divide by the standard deviation.
    ZScore,
    /// Divide by the largest absolute value.
    MaxAbs,
    /// Subtract the median, divide by the interquartile range.
    Robust,
}

impl NormalizeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizeStrategy::MinMax => "minmax",
            NormalizeStrategy::ZScore => "zscore",
            NormalizeStrategy::MaxAbs => "maxabs",
            NormalizeStrategy::Robust => "robust",
        }
    }
}

impl fmt::Display for NormalizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizeStrategy {
    type Err = WashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minmax" | "min-max" | "min_max" => Ok(NormalizeStrategy::MinMax),
            "zscore" | "z-score" | "standard" => Ok(NormalizeStrategy::ZScore),
            "maxabs" | "max-abs" => Ok(NormalizeStrategy::MaxAbs),
            "robust" => Ok(NormalizeStrategy::Robust),
            other => Err(WashError::InvalidArgument(format!(
                "unknown normalization strategy '{}'",
                other
            ))),
        }
    }
}

/// Target bounds for min-max scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    /// Create a range; `min` must be below `max` and both finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(WashError::InvalidArgument(format!(
                "scale range ({}, {}) must satisfy min < max",
                min, max
            )));
        }
        Ok(Self { min, max })
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl FromStr for ScaleRange {
    type Err = WashError;

    /// Parse `"min,max"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [min, max] = parts.as_slice() else {
            return Err(WashError::InvalidArgument(format!(
                "scale range '{}' must have two comma separated bounds",
                s
            )));
        };
        let parse = |p: &str| {
            p.parse::<f64>().map_err(|_| {
                WashError::InvalidArgument(format!("scale bound '{}' is not a number", p))
            })
        };
        ScaleRange::new(parse(*min)?, parse(*max)?)
    }
}

/// Rescales numeric columns.
pub trait Normalizer: Send + Sync {
    /// Return a copy of `dataset` with `columns` rescaled.
    fn normalize(
        &self,
        dataset: &Dataset,
        columns: &[String],
        strategy: NormalizeStrategy,
        range: ScaleRange,
    ) -> Result<Dataset>;
}

/// Default normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scaler;

impl Scaler {
    pub fn new() -> Self {
        Self
    }
}

impl Normalizer for Scaler {
    fn normalize(
        &self,
        dataset: &Dataset,
        columns: &[String],
        strategy: NormalizeStrategy,
        range: ScaleRange,
    ) -> Result<Dataset> {
        let mut scaled = dataset.clone();
        for name in columns {
            let column = dataset
                .column(name)
                .ok_or_else(|| WashError::UnknownColumn(name.clone()))?;
            if !column.has_numeric_view() {
                return Err(WashError::InvalidArgument(format!(
                    "column '{}' of type {} cannot be scaled",
                    name, column.dtype
                )));
            }
            debug!(column = %name, strategy = %strategy, "scaling column");
            scaled = scaled.with_column(scale_column(column, strategy, range))?;
        }
        Ok(scaled)
    }
}

fn scale_column(column: &Column, strategy: NormalizeStrategy, range: ScaleRange) -> Column {
    let numbers = column.numeric_values();
    let present: Vec<f64> = numbers.iter().flatten().copied().collect();
    let Some(summary) = NumericSummary::from_values(&present) else {
        return Column::new(column.name.clone(), column.values.clone(), SemanticType::Float);
    };

    let transform = |x: f64| -> f64 {
        match strategy {
            NormalizeStrategy::MinMax => {
                let span = summary.max - summary.min;
                if span == 0.0 {
                    range.min
                } else {
                    (x - summary.min) / span * (range.max - range.min) + range.min
                }
            }
            NormalizeStrategy::ZScore => summary.z_score(x),
            NormalizeStrategy::MaxAbs => {
                let max_abs = summary.max.abs().max(summary.min.abs());
                if max_abs == 0.0 { 0.0 } else { x / max_abs }
            }
            NormalizeStrategy::Robust => {
                let iqr = summary.iqr();
                if iqr == 0.0 {
                    x - summary.median
                } else {
                    (x - summary.median) / iqr
                }
            }
        }
    };

    let values = numbers
        .into_iter()
        .map(|n| n.map(|x| Value::Float(transform(x))).unwrap_or(Value::Null))
        .collect();
    Column::new(column.name.clone(), values, SemanticType::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::new(
                "x",
                vec![Value::Integer(0), Value::Integer(5), Value::Null, Value::Integer(10)],
                SemanticType::Integer,
            ),
            Column::new(
                "label",
                vec![Value::from("a"), Value::from("b"), Value::from("c"), Value::from("d")],
                SemanticType::Object,
            ),
        ])
        .unwrap()
    }

    fn floats(ds: &Dataset, name: &str) -> Vec<Option<f64>> {
        ds.column(name).unwrap().numeric_values()
    }

    #[test]
    fn test_scale_range_parsing() {
        assert_eq!(
            "0, 10".parse::<ScaleRange>().unwrap(),
            ScaleRange { min: 0.0, max: 10.0 }
        );
        assert!("1,0".parse::<ScaleRange>().is_err());
        assert!("1".parse::<ScaleRange>().is_err());
        assert!("a,b".parse::<ScaleRange>().is_err());
    }

    #[test]
    fn test_minmax_to_range() {
        let out = Scaler
            .normalize(
                &dataset(),
                &["x".to_string()],
                NormalizeStrategy::MinMax,
                ScaleRange::new(-1.0, 1.0).unwrap(),
            )
            .unwrap();
        assert_eq!(floats(&out, "x"), vec![Some(-1.0), Some(0.0), None, Some(1.0)]);
        assert_eq!(out.column("x").unwrap().dtype, SemanticType::Float);
    }

    #[test]
    fn test_zscore_centers() {
        let out = Scaler
            .normalize(
                &dataset(),
                &["x".to_string()],
                NormalizeStrategy::ZScore,
                ScaleRange::default(),
            )
            .unwrap();
        let values: Vec<f64> = floats(&out, "x").into_iter().flatten().collect();
        assert!(values.iter().sum::<f64>().abs() < 1e-9);
        assert!(values[2] > 1.0);
    }

    #[test]
    fn test_maxabs_and_robust() {
        let out = Scaler
            .normalize(
                &dataset(),
                &["x".to_string()],
                NormalizeStrategy::MaxAbs,
                ScaleRange::default(),
            )
            .unwrap();
        assert_eq!(floats(&out, "x")[1], Some(0.5));

        let out = Scaler
            .normalize(
                &dataset(),
                &["x".to_string()],
                NormalizeStrategy::Robust,
                ScaleRange::default(),
            )
            .unwrap();
        assert_eq!(floats(&out, "x")[1], Some(0.0));
    }

    #[test]
    fn test_non_numeric_column_rejected() {
        let result = Scaler.normalize(
            &dataset(),
            &["label".to_string()],
            NormalizeStrategy::MinMax,
            ScaleRange::default(),
        );
        assert!(matches!(result, Err(WashError::InvalidArgument(_))));

        let result = Scaler.normalize(
            &dataset(),
            &["nope".to_string()],
            NormalizeStrategy::MinMax,
            ScaleRange::default(),
        );
        assert!(matches!(result, Err(WashError::UnknownColumn(_))));
    }
}
