//! Data source descriptors, metadata and shared cell typing.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::data::{Column, SemanticType, Value};
use crate::error::{Result, WashError};

/// Where a dataset comes from.
///
/// The path selects the parser and names the dataset. When `contents` is
/// set it is parsed instead of reading the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl SourceDescriptor {
    /// A source read from disk.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: None,
        }
    }

    /// A source whose text is already in memory; `path` only names it.
    pub fn contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: Some(contents.into()),
        }
    }

    /// Lowercase file extension, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Load the raw bytes of the source.
    pub(crate) fn read_bytes(&self) -> Result<Vec<u8>> {
        if let Some(ref contents) = self.contents {
            return Ok(contents.as_bytes().to_vec());
        }
        let mut file = File::open(&self.path).map_err(|e| io_error(&self.path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| io_error(&self.path, e))?;
        Ok(bytes)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> WashError {
    WashError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Metadata about the source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the contents.
    pub hash: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, arff, etc.).
    pub format: String,
    /// Detected encoding.
    pub encoding: String,
    /// When the source was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe the given bytes read from `path`.
    pub fn new(path: &Path, bytes: &[u8], format: impl Into<String>) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        Self {
            file,
            path: path.to_path_buf(),
            hash,
            size_bytes: bytes.len() as u64,
            format: format.into(),
            encoding: "utf-8".to_string(),
            read_at: Utc::now(),
        }
    }
}

/// Declared type of an attribute in a structured source (ARFF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AttributeKind {
    Numeric,
    Integer,
    Real,
    String,
    /// Date with an optional Java-style format string.
    Date(Option<String>),
    /// Nominal attribute with its allowed values.
    Nominal(Vec<String>),
}

impl AttributeKind {
    /// Whether a column of the given type can be written with this kind.
    pub fn fits(&self, dtype: SemanticType) -> bool {
        match self {
            AttributeKind::Numeric | AttributeKind::Real => dtype.is_numeric(),
            AttributeKind::Integer => {
                matches!(dtype, SemanticType::Integer | SemanticType::Boolean)
            }
            AttributeKind::String => true,
            AttributeKind::Date(_) => dtype == SemanticType::DateTime,
            AttributeKind::Nominal(_) => !matches!(dtype, SemanticType::DateTime),
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Numeric => f.write_str("numeric"),
            AttributeKind::Integer => f.write_str("integer"),
            AttributeKind::Real => f.write_str("real"),
            AttributeKind::String => f.write_str("string"),
            AttributeKind::Date(None) => f.write_str("date"),
            AttributeKind::Date(Some(format)) => write!(f, "date \"{}\"", format),
            AttributeKind::Nominal(values) => {
                let quoted: Vec<String> = values.iter().map(|v| quote_arff(v)).collect();
                write!(f, "{{{}}}", quoted.join(","))
            }
        }
    }
}

/// A declared attribute (column) of a structured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Quote an ARFF token when it contains separators, quotes or spaces.
pub(crate) fn quote_arff(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token
            .chars()
            .any(|c| matches!(c, ' ' | '\t' | ',' | '\'' | '"' | '{' | '}' | '%' | '?'));
    if needs_quotes {
        format!("'{}'", token.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        token.to_string()
    }
}

/// Build a column from raw text cells, deciding the cell representation for
/// the whole column at once.
///
/// Cells matching a missing marker become nulls. A column whose remaining
/// cells all parse as integers holds Integer cells, else all as floats Float
/// cells, else all `true`/`false` Boolean cells; anything else stays text.
pub(crate) fn build_column(name: &str, raw: Vec<String>, na_values: &HashSet<String>) -> Column {
    let cells: Vec<Option<String>> = raw
        .into_iter()
        .map(|s| if na_values.contains(&s) { None } else { Some(s) })
        .collect();

    let present = || cells.iter().flatten().map(|s| s.trim());
    let any_present = cells.iter().any(Option::is_some);

    let (values, dtype): (Vec<Value>, SemanticType) = if !any_present {
        (vec![Value::Null; cells.len()], SemanticType::Object)
    } else if present().all(|s| s.parse::<i64>().is_ok()) {
        (
            map_cells(&cells, |s| s.trim().parse::<i64>().ok().map(Value::Integer)),
            SemanticType::Integer,
        )
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        (
            map_cells(&cells, |s| s.trim().parse::<f64>().ok().map(Value::Float)),
            SemanticType::Float,
        )
    } else if present().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"))
    {
        (
            map_cells(&cells, |s| Some(Value::Boolean(s.trim().eq_ignore_ascii_case("true")))),
            SemanticType::Boolean,
        )
    } else {
        (
            map_cells(&cells, |s| Some(Value::Text(s.to_string()))),
            SemanticType::Object,
        )
    };

    Column::new(name, values, dtype)
}

fn map_cells(cells: &[Option<String>], f: impl Fn(&str) -> Option<Value>) -> Vec<Value> {
    cells
        .iter()
        .map(|c| c.as_deref().and_then(&f).unwrap_or(Value::Null))
        .collect()
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
pub(crate) fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .map(|h| {
            if seen.insert(h.clone()) {
                return h;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{}.{}", h, n);
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}
