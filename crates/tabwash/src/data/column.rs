//! A named column of values with its current semantic type.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::types::SemanticType;
use super::value::Value;

/// A single column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cell values, one per row.
    pub values: Vec<Value>,
    /// Current semantic type.
    pub dtype: SemanticType,
}

impl Column {
    /// Create a column with the given type.
    pub fn new(name: impl Into<String>, values: Vec<Value>, dtype: SemanticType) -> Self {
        Self {
            name: name.into(),
            values,
            dtype,
        }
    }

    /// Create an untyped column; its type is [`SemanticType::Object`] until inference runs.
    pub fn untyped(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(name, values, SemanticType::Object)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing values, densely packed.
    pub fn non_null(&self) -> Vec<Value> {
        self.values.iter().filter(|v| !v.is_null()).cloned().collect()
    }

    /// Number of distinct non-missing values.
    pub fn unique_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .map(Value::key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Numeric view of every cell (None for missing or non-numeric cells).
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Returns true if every non-missing cell has a numeric view.
    pub fn is_numeric(&self) -> bool {
        self.values.iter().all(|v| v.is_null() || v.as_f64().is_some())
    }

    /// Whether the column can feed numeric operations: a numeric type, or a
    /// category (ratings, small counts) whose cells are all numeric.
    pub fn has_numeric_view(&self) -> bool {
        (self.dtype.is_numeric() || self.dtype == SemanticType::Category) && self.is_numeric()
    }

    /// Convert every cell to `dtype`.
    ///
    /// Returns the first value that does not convert on failure; the column is
    /// left untouched in that case.
    pub fn coerced(&self, dtype: SemanticType) -> Result<Column, Value> {
        let values = self
            .values
            .iter()
            .map(|v| v.coerce(dtype).ok_or_else(|| v.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Column::new(self.name.clone(), values, dtype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_count_ignores_nulls() {
        let col = Column::untyped(
            "c",
            vec![Value::from("a"), Value::Null, Value::from("a"), Value::from("b")],
        );
        assert_eq!(col.unique_count(), 2);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.non_null().len(), 3);
    }

    #[test]
    fn test_coerced_reports_offending_value() {
        let col = Column::untyped("c", vec![Value::from("1"), Value::from("x")]);
        assert_eq!(col.coerced(SemanticType::Integer), Err(Value::from("x")));

        let ok = Column::untyped("c", vec![Value::from("1"), Value::from("2")])
            .coerced(SemanticType::Integer)
            .unwrap();
        assert_eq!(ok.dtype, SemanticType::Integer);
        assert_eq!(ok.values, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_numeric_view_includes_numeric_categories() {
        let ratings = Column::new(
            "rating",
            vec![Value::Integer(1), Value::Null, Value::Integer(4)],
            SemanticType::Category,
        );
        assert!(ratings.has_numeric_view());

        let cities = Column::new(
            "city",
            vec![Value::from("Paris"), Value::from("Rome")],
            SemanticType::Category,
        );
        assert!(!cities.has_numeric_view());

        let ids = Column::new("id", vec![Value::Integer(7)], SemanticType::Object);
        assert!(!ids.has_numeric_view());
    }
}
