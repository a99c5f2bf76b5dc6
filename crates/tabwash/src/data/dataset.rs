//! Immutable dataset snapshots.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoercionError, Result, WashError};

use super::column::Column;
use super::types::SemanticType;
use super::value::Value;

/// An ordered set of equally long columns plus a stable row label per row.
///
/// Operations never mutate a dataset in place; they return a new snapshot.
/// Row labels start as `0..R` and follow their rows through removals and
/// reorderings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    index: Vec<usize>,
}

impl Dataset {
    /// Create a dataset with default row labels.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        Self::with_index(columns, (0..rows).collect())
    }

    /// Create a dataset with explicit row labels.
    pub fn with_index(columns: Vec<Column>, index: Vec<usize>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != index.len() {
                return Err(WashError::ShapeMismatch {
                    column: column.name.clone(),
                    expected: index.len(),
                    found: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(WashError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, index })
    }

    /// A dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: Vec::new(),
        }
    }

    /// Build a dataset from untyped rows of text, one `Vec` per row.
    pub fn from_rows(headers: &[&str], rows: &[Vec<&str>]) -> Result<Self> {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = rows
                    .iter()
                    .map(|row| row.get(i).map(|s| Value::from(*s)).unwrap_or(Value::Null))
                    .collect();
                Column::untyped(*name, values)
            })
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row labels in row order.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Current type of every column, in column order.
    pub fn dtypes(&self) -> IndexMap<String, SemanticType> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype))
            .collect()
    }

    /// Values of the row at `position` (not label).
    pub fn row(&self, position: usize) -> Option<Vec<&Value>> {
        if position >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[position]).collect())
    }

    /// Get a specific cell by row position and column position.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.columns.get(col).and_then(|c| c.values.get(row))
    }

    /// Total number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    pub fn has_missing(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.values.iter().any(Value::is_null))
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let positions: Vec<usize> = (0..n.min(self.row_count())).collect();
        self.take_rows(&positions)
    }

    /// Rows at the given positions, in the given order, keeping their labels.
    ///
    /// Positions must be in range.
    pub fn take_rows(&self, positions: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    positions.iter().map(|&p| c.values[p].clone()).collect(),
                    c.dtype,
                )
            })
            .collect();
        Dataset {
            columns,
            index: positions.iter().map(|&p| self.index[p]).collect(),
        }
    }

    /// Drop the rows carrying the given labels from every column.
    ///
    /// Fails without side effects if any label is not present.
    pub fn drop_rows(&self, labels: &BTreeSet<usize>) -> Result<Dataset> {
        let present: HashSet<usize> = self.index.iter().copied().collect();
        if let Some(missing) = labels.iter().find(|l| !present.contains(l)) {
            return Err(WashError::UnknownRow(*missing));
        }
        let keep: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, label)| !labels.contains(label))
            .map(|(pos, _)| pos)
            .collect();
        Ok(self.take_rows(&keep))
    }

    /// Convert the listed columns to the requested types.
    ///
    /// Either every listed column converts or nothing does: the first failure is
    /// returned and `self` is unaffected.
    pub fn with_dtypes(&self, requested: &IndexMap<String, SemanticType>) -> Result<Dataset> {
        let mut converted: HashMap<usize, Column> = HashMap::new();
        for (name, &dtype) in requested {
            let position = self
                .column_index(name)
                .ok_or_else(|| WashError::UnknownColumn(name.clone()))?;
            let column = self.columns[position]
                .coerced(dtype)
                .map_err(|value| CoercionError {
                    column: name.clone(),
                    target: dtype,
                    value: value.to_string(),
                })?;
            converted.insert(position, column);
        }

        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(pos, c)| converted.remove(&pos).unwrap_or_else(|| c.clone()))
            .collect();
        Ok(Dataset {
            columns,
            index: self.index.clone(),
        })
    }

    /// Replace the column with the same name, or append it if there is none.
    pub fn with_column(&self, column: Column) -> Result<Dataset> {
        if column.len() != self.row_count() && !(self.columns.is_empty() && self.index.is_empty())
        {
            return Err(WashError::ShapeMismatch {
                column: column.name.clone(),
                expected: self.row_count(),
                found: column.len(),
            });
        }
        let mut columns = self.columns.clone();
        match self.column_index(&column.name) {
            Some(pos) => columns[pos] = column,
            None => columns.push(column),
        }
        let index = if self.columns.is_empty() && self.index.is_empty() {
            (0..columns[0].len()).collect()
        } else {
            self.index.clone()
        };
        Ok(Dataset { columns, index })
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .index
            .iter()
            .map(|l| l.to_string().len())
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| {
                c.values
                    .iter()
                    .map(|v| v.to_string().chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name)?;
        }
        writeln!(f)?;

        for (pos, label) in self.index.iter().enumerate() {
            write!(f, "{:<label_width$}", label)?;
            for (column, width) in self.columns.iter().zip(&widths) {
                write!(f, "  {:>width$}", column.values[pos].to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            &["a", "b"],
            &[vec!["1", "x"], vec!["2", "y"], vec!["3", "z"], vec!["4", "w"]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = Dataset::new(vec![
            Column::untyped("a", vec![Value::Integer(1)]),
            Column::untyped("b", vec![]),
        ]);
        assert!(matches!(result, Err(WashError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = Dataset::new(vec![
            Column::untyped("a", vec![Value::Integer(1)]),
            Column::untyped("a", vec![Value::Integer(2)]),
        ]);
        assert!(matches!(result, Err(WashError::DuplicateColumn(_))));
    }

    #[test]
    fn test_drop_rows_keeps_labels() {
        let ds = sample();
        let dropped = ds.drop_rows(&BTreeSet::from([1])).unwrap();
        assert_eq!(dropped.index(), &[0, 2, 3]);
        assert_eq!(dropped.column("b").unwrap().values[1], Value::from("z"));

        // Label 1 is gone now
        assert!(matches!(
            dropped.drop_rows(&BTreeSet::from([1])),
            Err(WashError::UnknownRow(1))
        ));
        let again = dropped.drop_rows(&BTreeSet::from([3])).unwrap();
        assert_eq!(again.index(), &[0, 2]);
    }

    #[test]
    fn test_with_dtypes_is_all_or_nothing() {
        let ds = sample();
        let mut requested = IndexMap::new();
        requested.insert("a".to_string(), SemanticType::Integer);
        requested.insert("b".to_string(), SemanticType::Integer);

        let err = ds.with_dtypes(&requested).unwrap_err();
        match err {
            WashError::Coercion(e) => {
                assert_eq!(e.column, "b");
                assert_eq!(e.target, SemanticType::Integer);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ds.column("a").unwrap().dtype, SemanticType::Object);

        requested.shift_remove("b");
        let typed = ds.with_dtypes(&requested).unwrap();
        assert_eq!(typed.column("a").unwrap().dtype, SemanticType::Integer);
        assert_eq!(typed.column("b").unwrap().dtype, SemanticType::Object);
    }

    #[test]
    fn test_head_and_take_rows() {
        let ds = sample();
        assert_eq!(ds.head(2).row_count(), 2);
        assert_eq!(ds.head(10).row_count(), 4);

        let reordered = ds.take_rows(&[3, 0]);
        assert_eq!(reordered.index(), &[3, 0]);
        assert_eq!(reordered.get(0, 1), Some(&Value::from("w")));
    }

    #[test]
    fn test_with_column_replaces_and_appends() {
        let ds = sample();
        let replaced = ds
            .with_column(Column::untyped("a", vec![Value::Null; 4]))
            .unwrap();
        assert_eq!(replaced.column_count(), 2);
        assert_eq!(replaced.missing_count(), 4);

        let appended = ds
            .with_column(Column::untyped("c", vec![Value::Integer(0); 4]))
            .unwrap();
        assert_eq!(appended.column_names(), vec!["a", "b", "c"]);

        assert!(ds
            .with_column(Column::untyped("c", vec![Value::Integer(0); 3]))
            .is_err());
    }
}
