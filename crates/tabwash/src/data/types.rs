//! Semantic column types assigned by inference.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WashError;

/// Semantic type of a column, independent of how its cells are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Two-valued numeric column (0/1 style).
    Boolean,
    /// Low-cardinality or two-valued non-numeric column.
    Category,
    /// Dates and date-times.
    DateTime,
    /// Fractional numbers.
    Float,
    /// Whole numbers.
    Integer,
    /// Anything else, usually free text.
    Object,
}

impl SemanticType {
    /// All types, in declaration order.
    pub const ALL: [SemanticType; 6] = [
        SemanticType::Boolean,
        SemanticType::Category,
        SemanticType::DateTime,
        SemanticType::Float,
        SemanticType::Integer,
        SemanticType::Object,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Boolean => "boolean",
            SemanticType::Category => "category",
            SemanticType::DateTime => "datetime",
            SemanticType::Float => "float",
            SemanticType::Integer => "integer",
            SemanticType::Object => "object",
        }
    }

    /// Returns true if cells of this type have a numeric view.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Integer | SemanticType::Float | SemanticType::Boolean
        )
    }
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::Object
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = WashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "category" | "categorical" => Ok(SemanticType::Category),
            "datetime" | "date" | "datetime64" | "datetime64[ns]" => Ok(SemanticType::DateTime),
            "float" | "float64" | "double" | "real" => Ok(SemanticType::Float),
            "integer" | "int" | "int64" => Ok(SemanticType::Integer),
            "object" | "str" | "string" | "text" => Ok(SemanticType::Object),
            other => Err(WashError::InvalidArgument(format!(
                "unknown column type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("bool".parse::<SemanticType>().unwrap(), SemanticType::Boolean);
        assert_eq!("int64".parse::<SemanticType>().unwrap(), SemanticType::Integer);
        assert_eq!("float64".parse::<SemanticType>().unwrap(), SemanticType::Float);
        assert_eq!(
            "datetime64[ns]".parse::<SemanticType>().unwrap(),
            SemanticType::DateTime
        );
        assert_eq!(" String ".parse::<SemanticType>().unwrap(), SemanticType::Object);
        assert!("complex".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for ty in SemanticType::ALL {
            assert_eq!(ty.as_str().parse::<SemanticType>().unwrap(), ty);
        }
    }
}
