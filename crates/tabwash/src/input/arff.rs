//! ARFF (Attribute-Relation File Format) parser.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::{Column, Dataset, Value};
use crate::error::{Result, WashError};

use super::source::{
    build_column, dedupe_headers, Attribute, AttributeKind, SourceDescriptor, SourceMetadata,
};
use super::{ParserConfig, ParserHandle};

static RELATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^@relation\s+(.+?)\s*$"#).expect("valid relation regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^@attribute\s+('(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|\S+)\s+(.+?)\s*$"#)
        .expect("valid attribute regex")
});

static DATE_KIND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^date(?:\s+['"]?(.*?)['"]?)?$"#).expect("valid date regex")
});

/// Marker for a missing value in ARFF data.
const ARFF_MISSING: &str = "?";

/// Parses ARFF sources. The header is read eagerly; data rows on `parse`.
pub struct ArffParser {
    name: String,
    description: String,
    attributes: Vec<Attribute>,
    data_lines: Vec<(usize, String)>,
    na_values: HashSet<String>,
    max_rows: Option<usize>,
    metadata: SourceMetadata,
}

impl ArffParser {
    /// Read the source and parse its header.
    pub fn new(source: &SourceDescriptor, config: ParserConfig) -> Result<Self> {
        let bytes = source.read_bytes()?;
        let metadata = SourceMetadata::new(&source.path, &bytes, "arff");
        let text = String::from_utf8_lossy(&bytes);

        let mut name = source.stem();
        let mut description_lines: Vec<String> = Vec::new();
        let mut attributes = Vec::new();
        let mut seen_relation = false;
        let mut data_start = None;

        let lines: Vec<&str> = text.lines().collect();
        for (line_no, raw_line) in lines.iter().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('%') {
                if !seen_relation {
                    description_lines.push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
                }
                continue;
            }
            if let Some(caps) = RELATION.captures(line) {
                name = unquote(&caps[1]);
                seen_relation = true;
            } else if let Some(caps) = ATTRIBUTE.captures(line) {
                let kind = parse_kind(&caps[2]).ok_or_else(|| WashError::Parse {
                    row: line_no + 1,
                    column: attributes.len(),
                    message: format!("unsupported attribute type '{}'", &caps[2]),
                })?;
                attributes.push(Attribute::new(unquote(&caps[1]), kind));
            } else if line.eq_ignore_ascii_case("@data") {
                data_start = Some(line_no + 1);
                break;
            } else {
                return Err(WashError::Parse {
                    row: line_no + 1,
                    column: 0,
                    message: format!("unexpected header line '{}'", line),
                });
            }
        }

        let data_start = data_start
            .ok_or_else(|| WashError::EmptyData("ARFF source has no @data section".to_string()))?;
        if attributes.is_empty() {
            return Err(WashError::EmptyData("No attributes declared".to_string()));
        }

        let data_lines = lines
            .iter()
            .enumerate()
            .skip(data_start)
            .map(|(i, l)| (i + 1, l.trim().to_string()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('%'))
            .collect();

        let mut na_values: HashSet<String> = config.na_values.iter().cloned().collect();
        na_values.insert(ARFF_MISSING.to_string());

        Ok(Self {
            name,
            description: description_lines.join("\n"),
            attributes,
            data_lines,
            na_values,
            max_rows: config.max_rows,
            metadata,
        })
    }
}

impl ParserHandle for ArffParser {
    fn parse(&self) -> Result<Dataset> {
        let width = self.attributes.len();
        let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); width];

        for (count, (line_no, line)) in self.data_lines.iter().enumerate() {
            if let Some(max) = self.max_rows {
                if count >= max {
                    break;
                }
            }
            if line.starts_with('{') {
                return Err(WashError::Parse {
                    row: *line_no,
                    column: 0,
                    message: "sparse ARFF rows are not supported".to_string(),
                });
            }
            let cells = split_row(line);
            if cells.len() != width {
                return Err(WashError::Parse {
                    row: *line_no,
                    column: cells.len().min(width),
                    message: format!("expected {} values, found {}", width, cells.len()),
                });
            }
            for (col, cell) in cells.into_iter().enumerate() {
                raw_columns[col].push(cell);
            }
        }

        if raw_columns[0].is_empty() {
            return Err(WashError::EmptyData("No data rows found".to_string()));
        }

        let names = dedupe_headers(self.attributes.iter().map(|a| a.name.clone()).collect());
        let columns = names
            .iter()
            .zip(&self.attributes)
            .zip(raw_columns)
            .map(|((name, attribute), raw)| match attribute.kind {
                AttributeKind::Numeric | AttributeKind::Integer | AttributeKind::Real => {
                    build_column(name, raw, &self.na_values)
                }
                _ => Column::untyped(
                    name.as_str(),
                    raw.into_iter()
                        .map(|s| {
                            if self.na_values.contains(&s) {
                                Value::Null
                            } else {
                                Value::Text(s)
                            }
                        })
                        .collect(),
                ),
            })
            .collect();

        Dataset::new(columns)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

fn parse_kind(declared: &str) -> Option<AttributeKind> {
    let declared = declared.trim();
    if let Some(inner) = declared.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let values = split_row(inner);
        return Some(AttributeKind::Nominal(values));
    }
    if let Some(caps) = DATE_KIND.captures(declared) {
        let format = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .filter(|f| !f.is_empty());
        return Some(AttributeKind::Date(format));
    }
    match declared.to_ascii_lowercase().as_str() {
        "numeric" => Some(AttributeKind::Numeric),
        "integer" => Some(AttributeKind::Integer),
        "real" => Some(AttributeKind::Real),
        "string" => Some(AttributeKind::String),
        _ => None,
    }
}

/// Strip surrounding single or double quotes and unescape.
fn unquote(token: &str) -> String {
    let token = token.trim();
    let inner = token
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .or_else(|| token.strip_prefix('"').and_then(|t| t.strip_suffix('"')));
    match inner {
        Some(inner) => inner.replace("\\'", "'").replace("\\\"", "\"").replace("\\\\", "\\"),
        None => token.to_string(),
    }
}

/// Split a comma separated ARFF row, honoring single and double quotes.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut was_quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(_), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => {
                // Whitespace before an opening quote is not part of the value
                if current.trim().is_empty() {
                    current.clear();
                }
                quote = Some(ch);
                was_quoted = true;
            }
            (None, ',') => {
                cells.push(finish_cell(&current, was_quoted));
                current.clear();
                was_quoted = false;
            }
            (None, c) if was_quoted && c.is_whitespace() => {}
            (None, c) => current.push(c),
        }
    }
    cells.push(finish_cell(&current, was_quoted));
    cells
}

fn finish_cell(cell: &str, quoted: bool) -> String {
    if quoted {
        cell.to_string()
    } else {
        cell.trim().to_string()
    }
}
