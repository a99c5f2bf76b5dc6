//! CSV/TSV parser with delimiter detection.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};

use crate::data::Dataset;
use crate::error::{Result, WashError};

use super::source::{build_column, dedupe_headers, SourceDescriptor, SourceMetadata};
use super::{ParserConfig, ParserHandle};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parses delimited text sources.
pub struct DelimitedParser {
    config: ParserConfig,
    name: String,
    contents: Vec<u8>,
    delimiter: u8,
    metadata: SourceMetadata,
}

impl DelimitedParser {
    /// Read the source and detect its delimiter.
    pub fn new(source: &SourceDescriptor, config: ParserConfig) -> Result<Self> {
        let contents = source.read_bytes()?;

        let delimiter = match config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };
        let metadata = SourceMetadata::new(&source.path, &contents, format);

        Ok(Self {
            config,
            name: source.stem(),
            contents,
            delimiter,
            metadata,
        })
    }

    /// The delimiter in use.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn parse_bytes(&self) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(self.contents.as_slice());

        let mut records = reader.records();

        // Get headers
        let headers: Vec<String> = if self.config.has_header {
            match records.next() {
                Some(record) => record?.iter().map(|s| s.to_string()).collect(),
                None => return Err(WashError::EmptyData("No header row found".to_string())),
            }
        } else {
            Vec::new()
        };

        // Read rows
        let mut rows: Vec<Vec<String>> = Vec::new();
        for (row_idx, result) in records.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let headers = if self.config.has_header {
            headers
        } else {
            // Generate column names
            let width = rows.first().map(Vec::len).unwrap_or(0);
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() {
            return Err(WashError::EmptyData("No columns found".to_string()));
        }
        if rows.is_empty() {
            return Err(WashError::EmptyData("No data rows found".to_string()));
        }

        let expected_cols = headers.len();
        let mut raw_columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); expected_cols];
        for row in rows {
            let mut row = row;
            // Pad short rows, truncate long ones
            row.resize(expected_cols, String::new());
            for (col, cell) in row.into_iter().enumerate() {
                raw_columns[col].push(cell);
            }
        }

        let na_values: HashSet<String> = self.config.na_values.iter().cloned().collect();
        let columns = dedupe_headers(headers)
            .iter()
            .zip(raw_columns)
            .map(|(name, raw)| build_column(name, raw, &na_values))
            .collect();

        Dataset::new(columns)
    }
}

impl ParserHandle for DelimitedParser {
    fn parse(&self) -> Result<Dataset> {
        self.parse_bytes()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(WashError::EmptyData("No lines to analyze".to_string()));
    }

    // Count occurrences of each delimiter in each line
    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance is better; tab gets a slight bonus
        // as it's less common in actual data
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SemanticType, Value};

    fn parser(contents: &str) -> DelimitedParser {
        DelimitedParser::new(
            &SourceDescriptor::contents("people.csv", contents),
            ParserConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv() {
        let p = parser("name,age,city\nAlice,30,NYC\nBob,25,LA");
        let table = p.parse().unwrap();

        assert_eq!(p.name(), "people");
        assert_eq!(p.metadata().format, "csv");
        assert!(p.metadata().hash.starts_with("sha256:"));
        assert_eq!(table.column_names(), vec!["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 0), Some(&Value::from("Alice")));
        assert_eq!(table.get(1, 1), Some(&Value::Integer(25)));
        assert_eq!(table.column("age").unwrap().dtype, SemanticType::Integer);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = parser("a,b,c\n1,2\n4,5,6,7").parse().unwrap();
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.get(0, 2), Some(&Value::Null));
    }

    #[test]
    fn test_missing_markers_become_null() {
        let table = parser("a,b\n1,NA\n2,x\n,y").parse().unwrap();
        assert_eq!(table.get(0, 1), Some(&Value::Null));
        assert_eq!(table.get(2, 0), Some(&Value::Null));
        assert_eq!(table.missing_count(), 2);
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            parser("a,b\n").parse(),
            Err(WashError::EmptyData(_))
        ));
    }

    #[test]
    fn test_without_header() {
        let config = ParserConfig {
            has_header: false,
            ..ParserConfig::default()
        };
        let p = DelimitedParser::new(&SourceDescriptor::contents("x.csv", "1,2\n3,4"), config)
            .unwrap();
        let table = p.parse().unwrap();
        assert_eq!(table.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let config = ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        };
        let p = DelimitedParser::new(
            &SourceDescriptor::contents("x.csv", "a\n1\n2\n3"),
            config,
        )
        .unwrap();
        assert_eq!(p.parse().unwrap().row_count(), 1);
    }
}
