//! Column type tags and schema maps

use std::collections::HashMap;
use std::fmt;

/// Column name → declared type for one table.
pub type TableSchema = HashMap<String, ColumnType>;

/// Table name → table schema.
pub type SchemaMap = HashMap<String, TableSchema>;

/// Declared storage type of a column, derived purely from DDL text.
///
/// Length and constraint qualifiers are stripped during parsing, so
/// `STRING(36)` and `STRING(MAX)` both map to `String`. Base keywords the
/// converter has no special handling for (BYTES, DATE, NUMERIC, ...) land
/// in `Other` and get passthrough conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Int64,
    Float64,
    Bool,
    Timestamp,
    Json,
    Array(Box<ColumnType>),
    Other(String),
}

impl ColumnType {
    /// Parse a raw type token from DDL, e.g. `STRING(36)`, `ARRAY<INT64>`,
    /// `TIMESTAMP`.
    pub fn parse(raw: &str) -> ColumnType {
        let trimmed = raw.trim().trim_end_matches(',');
        let upper = trimmed.to_ascii_uppercase();

        if let Some(inner) = upper
            .strip_prefix("ARRAY<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return ColumnType::Array(Box::new(ColumnType::parse(inner)));
        }

        // Strip length qualifiers: STRING(36) -> STRING
        let base = upper.split('(').next().unwrap_or(&upper).trim();
        match base {
            "STRING" => ColumnType::String,
            "INT64" => ColumnType::Int64,
            "FLOAT64" => ColumnType::Float64,
            "BOOL" => ColumnType::Bool,
            "TIMESTAMP" => ColumnType::Timestamp,
            "JSON" => ColumnType::Json,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "STRING"),
            ColumnType::Int64 => write!(f, "INT64"),
            ColumnType::Float64 => write!(f, "FLOAT64"),
            ColumnType::Bool => write!(f, "BOOL"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
            ColumnType::Json => write!(f, "JSON"),
            ColumnType::Array(inner) => write!(f, "ARRAY<{}>", inner),
            ColumnType::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_qualifiers() {
        assert_eq!(ColumnType::parse("STRING(36)"), ColumnType::String);
        assert_eq!(ColumnType::parse("STRING(MAX)"), ColumnType::String);
        assert_eq!(ColumnType::parse("INT64"), ColumnType::Int64);
        assert_eq!(ColumnType::parse("timestamp"), ColumnType::Timestamp);
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            ColumnType::parse("ARRAY<STRING(MAX)>"),
            ColumnType::Array(Box::new(ColumnType::String))
        );
        assert_eq!(
            ColumnType::parse("ARRAY<INT64>"),
            ColumnType::Array(Box::new(ColumnType::Int64))
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            ColumnType::parse("NUMERIC"),
            ColumnType::Other("NUMERIC".to_string())
        );
        assert_eq!(
            ColumnType::parse("BYTES(1024)"),
            ColumnType::Other("BYTES".to_string())
        );
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(ColumnType::parse("ARRAY<INT64>").to_string(), "ARRAY<INT64>");
        assert_eq!(ColumnType::parse("JSON").to_string(), "JSON");
    }
}
