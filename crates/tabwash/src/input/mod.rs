//! Input parsing and data source handling.

mod arff;
mod delimited;
mod source;

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{Result, WashError};

pub use arff::ArffParser;
pub use delimited::DelimitedParser;
pub use source::{Attribute, AttributeKind, SourceDescriptor, SourceMetadata};
pub(crate) use source::quote_arff;

/// Values treated as missing when reading a source.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Cell contents read as missing values.
    pub na_values: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A parser bound to one source.
pub trait ParserHandle: Send + Sync {
    /// Parse the source into a raw dataset.
    fn parse(&self) -> Result<Dataset>;

    /// Dataset name reported by the source.
    fn name(&self) -> &str;

    /// Declared attributes, for formats that carry them.
    fn attributes(&self) -> &[Attribute] {
        &[]
    }

    /// Free-text description, for formats that carry one.
    fn description(&self) -> &str {
        ""
    }

    /// Metadata about the source.
    fn metadata(&self) -> &SourceMetadata;
}

/// Select a parser for a source from its file extension.
pub fn assign_parser(
    source: &SourceDescriptor,
    config: &ParserConfig,
) -> Result<Box<dyn ParserHandle>> {
    match source.extension().as_deref() {
        Some("csv") | Some("tsv") | Some("txt") | Some("data") | Some("psv") => {
            Ok(Box::new(DelimitedParser::new(source, config.clone())?))
        }
        Some("arff") => Ok(Box::new(ArffParser::new(source, config.clone())?)),
        Some(other) => Err(WashError::UnsupportedFormat(format!(
            "no parser for '.{}' files",
            other
        ))),
        None => Err(WashError::UnsupportedFormat(format!(
            "cannot determine format of '{}'",
            source.path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_by_extension() {
        let csv = assign_parser(
            &SourceDescriptor::contents("data/iris.CSV", "a,b\n1,2\n"),
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(csv.name(), "iris");
        assert!(csv.attributes().is_empty());

        let arff = assign_parser(
            &SourceDescriptor::contents("x.arff", "@relation iris\n@attribute a numeric\n@data\n1\n"),
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(arff.name(), "iris");
        assert_eq!(arff.attributes().len(), 1);
    }

    #[test]
    fn test_unknown_extension() {
        let result = assign_parser(
            &SourceDescriptor::contents("x.xlsx", ""),
            &ParserConfig::default(),
        );
        assert!(matches!(result, Err(WashError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = assign_parser(
            &SourceDescriptor::file("/definitely/not/here.csv"),
            &ParserConfig::default(),
        );
        assert!(matches!(result, Err(WashError::Io { .. })));
    }
}
