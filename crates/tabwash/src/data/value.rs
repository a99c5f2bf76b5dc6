//! Cell values and conversions between representations.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::types::SemanticType;

/// Date-only layouts accepted when converting text to a date-time.
/// Month-first layouts are tried before day-first ones.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y",
];

/// Date-time layouts accepted when converting text to a date-time.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A single cell.
///
/// The representation of a cell is decided once, when a parser reads it.
/// Later operations only change it through [`Value::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

/// Hashable identity of a value, used for distinct counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true for a missing cell.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value behaves as text.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Numeric view of Integer, Float and Boolean cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Whether the value converts to an integer without error.
    ///
    /// Text qualifies when its trimmed form is an integer literal.
    pub fn converts_to_integer(&self) -> bool {
        match self {
            Value::Integer(_) | Value::Boolean(_) => true,
            Value::Float(f) => f.is_finite(),
            Value::Text(s) => s.trim().parse::<i64>().is_ok(),
            Value::Null | Value::DateTime(_) => false,
        }
    }

    /// Hashable key for distinct counting.
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Integer(i) => ValueKey::Integer(*i),
            // -0.0 and 0.0 are the same value
            Value::Float(f) => ValueKey::Float(if *f == 0.0 { 0 } else { f.to_bits() }),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::DateTime(dt) => ValueKey::DateTime(*dt),
        }
    }

    /// Text form used by exporters and previews. Null renders as an empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
                    format!("{:.1}", f)
                } else {
                    f.to_string()
                }
            }
            Value::Text(s) => s.clone(),
            Value::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }

    /// Convert this value to the representation of `target`.
    ///
    /// Returns `None` when the conversion is not possible. Null survives every
    /// target except [`SemanticType::Integer`].
    pub fn coerce(&self, target: SemanticType) -> Option<Value> {
        match target {
            SemanticType::Category | SemanticType::Object => Some(self.clone()),
            SemanticType::Boolean => self.to_boolean(),
            SemanticType::DateTime => self.to_datetime(),
            SemanticType::Float => self.to_float(),
            SemanticType::Integer => self.to_integer(),
        }
    }

    fn to_boolean(&self) -> Option<Value> {
        match self {
            Value::Null => Some(Value::Null),
            Value::Boolean(b) => Some(Value::Boolean(*b)),
            Value::Integer(i) => Some(Value::Boolean(*i != 0)),
            Value::Float(f) => Some(Value::Boolean(*f != 0.0)),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "t" | "y" | "1" => Some(Value::Boolean(true)),
                "false" | "no" | "f" | "n" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            Value::DateTime(_) => None,
        }
    }

    fn to_datetime(&self) -> Option<Value> {
        match self {
            Value::Null => Some(Value::Null),
            Value::DateTime(dt) => Some(Value::DateTime(*dt)),
            Value::Text(s) => parse_datetime(s.trim()).map(Value::DateTime),
            _ => None,
        }
    }

    fn to_float(&self) -> Option<Value> {
        match self {
            Value::Null => Some(Value::Null),
            Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::Float),
            other => other.as_f64().map(Value::Float),
        }
    }

    fn to_integer(&self) -> Option<Value> {
        match self {
            Value::Integer(i) => Some(Value::Integer(*i)),
            Value::Boolean(b) => Some(Value::Integer(i64::from(*b))),
            Value::Float(f) if f.is_finite() && f.abs() < 9.2e18 => {
                Some(Value::Integer(f.trunc() as i64))
            }
            Value::Text(s) => s.trim().parse::<i64>().ok().map(Value::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NaN"),
            other => f.write_str(&other.render()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Parse a date or date-time string in one of the accepted layouts.
pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}
