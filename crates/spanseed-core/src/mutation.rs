//! Atomic insert-row instruction

use crate::error::{CoreError, CoreResult};
use crate::value::SpannerValue;

/// One "insert row" instruction: table name plus parallel column and value
/// lists. Immutable once built; the column and value lists are always the
/// same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    table: String,
    columns: Vec<String>,
    values: Vec<SpannerValue>,
}

impl Mutation {
    /// Build an insert mutation, rejecting mismatched column/value lengths.
    pub fn insert(
        table: impl Into<String>,
        columns: Vec<String>,
        values: Vec<SpannerValue>,
    ) -> CoreResult<Self> {
        let table = table.into();
        if columns.len() != values.len() {
            return Err(CoreError::ColumnValueMismatch {
                table,
                columns: columns.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            table,
            columns,
            values,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SpannerValue] {
        &self.values
    }

    /// Wire form for a commit request:
    /// `{"insert": {"table": ..., "columns": [...], "values": [[...]]}}`.
    pub fn to_rest_json(&self) -> serde_json::Value {
        let row: Vec<serde_json::Value> = self.values.iter().map(|v| v.to_rest_json()).collect();
        serde_json::json!({
            "insert": {
                "table": self.table,
                "columns": self.columns,
                "values": [row],
            }
        })
    }
}
