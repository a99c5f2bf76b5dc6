//! Serialization of datasets to CSV and ARFF text.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::data::{Column, Dataset, SemanticType, Value};
use crate::error::{Result, WashError};
use crate::input::{quote_arff, Attribute, AttributeKind};

/// Java-style date format written for derived date attributes.
const ARFF_DATE_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Arff,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Arff => "arff",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = WashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "arff" => Ok(ExportFormat::Arff),
            other => Err(WashError::UnsupportedFormat(format!(
                "'{}' is not a supported export format (csv, arff)",
                other
            ))),
        }
    }
}

/// Write a dataset as CSV with a header row. Missing cells are empty fields.
pub fn export_csv(dataset: &Dataset) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(dataset.column_names())?;
    for position in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| c.values[position].render())
            .collect();
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| WashError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write a dataset as ARFF.
///
/// Declared `attributes` are reused for columns they still describe; other
/// columns get a kind derived from their type.
pub fn export_arff(
    name: &str,
    dataset: &Dataset,
    attributes: &[Attribute],
    description: &str,
) -> Result<String> {
    let mut out = String::new();
    for line in description.lines() {
        out.push_str(&format!("% {}\n", line));
    }
    if !description.is_empty() {
        out.push('\n');
    }
    let relation = if name.is_empty() { "dataset" } else { name };
    out.push_str(&format!("@relation {}\n", quote_arff(relation)));
    out.push('\n');

    let kinds: Vec<AttributeKind> = dataset
        .columns()
        .iter()
        .map(|column| {
            let declared = attributes.iter().find(|a| a.name == column.name);
            attribute_kind(column, declared.map(|a| &a.kind))
        })
        .collect();

    for (column, kind) in dataset.columns().iter().zip(&kinds) {
        out.push_str(&format!("@attribute {} {}\n", quote_arff(&column.name), kind));
    }
    out.push_str("\n@data\n");

    for position in 0..dataset.row_count() {
        let cells: Vec<String> = dataset
            .columns()
            .iter()
            .zip(&kinds)
            .map(|(column, kind)| arff_cell(&column.values[position], kind))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    Ok(out)
}

fn attribute_kind(column: &Column, declared: Option<&AttributeKind>) -> AttributeKind {
    match declared {
        Some(AttributeKind::Nominal(allowed)) if column.dtype != SemanticType::DateTime => {
            let all_allowed = column
                .values
                .iter()
                .filter(|v| !v.is_null())
                .all(|v| allowed.contains(&v.render()));
            if all_allowed {
                return AttributeKind::Nominal(allowed.clone());
            }
        }
        // Dates are always rewritten in one known format
        Some(AttributeKind::Date(_)) => {}
        Some(kind) if kind.fits(column.dtype) && column_fits_numeric(column, kind) => {
            return kind.clone();
        }
        _ => {}
    }

    match column.dtype {
        SemanticType::Integer | SemanticType::Float | SemanticType::Boolean
            if column.is_numeric() =>
        {
            AttributeKind::Numeric
        }
        SemanticType::Category => {
            let levels: IndexSet<String> = column
                .values
                .iter()
                .filter(|v| !v.is_null())
                .map(Value::render)
                .collect();
            AttributeKind::Nominal(levels.into_iter().collect())
        }
        SemanticType::DateTime => AttributeKind::Date(Some(ARFF_DATE_FORMAT.to_string())),
        _ => AttributeKind::String,
    }
}

/// Numeric kinds need cells that are actually numbers.
fn column_fits_numeric(column: &Column, kind: &AttributeKind) -> bool {
    match kind {
        AttributeKind::Numeric | AttributeKind::Real | AttributeKind::Integer => column.is_numeric(),
        _ => true,
    }
}

fn arff_cell(value: &Value, kind: &AttributeKind) -> String {
    match (value, kind) {
        (Value::Null, _) => "?".to_string(),
        (Value::Boolean(b), AttributeKind::Numeric | AttributeKind::Real | AttributeKind::Integer) => {
            (if *b { "1" } else { "0" }).to_string()
        }
        (Value::DateTime(dt), AttributeKind::Date(_)) => {
            quote_arff(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
        (other, _) => quote_arff(&other.render()),
    }
}
