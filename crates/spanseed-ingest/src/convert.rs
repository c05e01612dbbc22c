//! Per-column value coercion
//!
//! Conversion is permissive by design: a value that cannot be coerced to
//! the declared type passes through in its natural representation with a
//! warning instead of failing the batch. The store rejects truly
//! incompatible values at apply time, which surfaces a far better error
//! than a conversion panic would.

use chrono::{DateTime, Utc};
use spanseed_core::value::{SeedValue, SpannerValue};
use spanseed_schema::ColumnType;

/// Coerce a raw seed value into the representation `declared` expects.
///
/// `table` and `column` are only used for warning messages.
pub fn convert_value(
    table: &str,
    column: &str,
    raw: &SeedValue,
    declared: &ColumnType,
) -> SpannerValue {
    // Null short-circuits regardless of declared type
    if raw.is_null() {
        return SpannerValue::Null;
    }

    // Timestamp strings get special handling independent of the generic
    // switch: TIMESTAMP columns parse to a time value, INT64 columns parse
    // then collapse to epoch seconds. Parse failure falls through.
    if let Some(text) = raw.as_str() {
        match declared {
            ColumnType::Timestamp => match parse_timestamp(text) {
                Some(ts) => return SpannerValue::Timestamp(ts),
                None => {
                    log::warn!(
                        "{}.{}: '{}' is not an RFC 3339 timestamp, passing through as text",
                        table,
                        column,
                        text
                    );
                }
            },
            ColumnType::Int64 => {
                if let Some(ts) = parse_timestamp(text) {
                    return SpannerValue::Int64(ts.timestamp());
                }
            }
            _ => {}
        }
    }

    match declared {
        ColumnType::String => match raw {
            SeedValue::String(s) => SpannerValue::String(s.clone()),
            other => {
                log::debug!(
                    "{}.{}: coercing {} to STRING",
                    table,
                    column,
                    other.type_name()
                );
                passthrough(other)
            }
        },
        ColumnType::Int64 => match raw {
            SeedValue::Int(i) => SpannerValue::Int64(*i),
            SeedValue::Float(f) => SpannerValue::Int64(*f as i64),
            other => {
                log::warn!(
                    "{}.{}: expected numeric for INT64, got {}",
                    table,
                    column,
                    other.type_name()
                );
                passthrough(other)
            }
        },
        ColumnType::Float64 => match raw {
            SeedValue::Float(f) => SpannerValue::Float64(*f),
            SeedValue::Int(i) => SpannerValue::Float64(*i as f64),
            other => {
                log::warn!(
                    "{}.{}: expected numeric for FLOAT64, got {}",
                    table,
                    column,
                    other.type_name()
                );
                passthrough(other)
            }
        },
        ColumnType::Bool => match raw {
            SeedValue::Bool(b) => SpannerValue::Bool(*b),
            other => {
                log::warn!(
                    "{}.{}: expected boolean for BOOL, got {}",
                    table,
                    column,
                    other.type_name()
                );
                passthrough(other)
            }
        },
        ColumnType::Json => match raw {
            // Textual input is assumed pre-serialized
            SeedValue::String(s) => SpannerValue::Json(s.clone()),
            structured => match serde_json::to_string(&structured.to_json()) {
                Ok(text) => SpannerValue::Json(text),
                Err(e) => {
                    log::warn!(
                        "{}.{}: failed to serialize value for JSON column: {}",
                        table,
                        column,
                        e
                    );
                    passthrough(structured)
                }
            },
        },
        ColumnType::Array(_) => match raw {
            SeedValue::List(items) => convert_array(table, column, items),
            other => {
                log::warn!(
                    "{}.{}: expected list for ARRAY column, got {}",
                    table,
                    column,
                    other.type_name()
                );
                passthrough(other)
            }
        },
        ColumnType::Timestamp | ColumnType::Other(_) => passthrough(raw),
    }
}

/// Element coercion is decided by the first element's runtime type:
/// integer-like lists become INT64 arrays, anything else becomes a string
/// array. Empty lists default to an empty string array.
fn convert_array(table: &str, column: &str, items: &[SeedValue]) -> SpannerValue {
    match items.first() {
        None => SpannerValue::StringArray(Vec::new()),
        Some(SeedValue::Int(_)) | Some(SeedValue::Float(_)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    SeedValue::Int(i) => out.push(*i),
                    SeedValue::Float(f) => out.push(*f as i64),
                    other => {
                        log::warn!(
                            "{}.{}: skipping non-numeric {} in integer array",
                            table,
                            column,
                            other.type_name()
                        );
                    }
                }
            }
            SpannerValue::Int64Array(out)
        }
        Some(_) => {
            let out = items
                .iter()
                .map(|item| match item {
                    SeedValue::String(s) => s.clone(),
                    other => stringify(other),
                })
                .collect();
            SpannerValue::StringArray(out)
        }
    }
}

/// Natural representation for a value whose declared type is unknown or
/// whose shape did not match: scalars keep their own type, structures
/// become JSON text.
fn passthrough(raw: &SeedValue) -> SpannerValue {
    match raw {
        SeedValue::Null => SpannerValue::Null,
        SeedValue::Bool(b) => SpannerValue::Bool(*b),
        SeedValue::Int(i) => SpannerValue::Int64(*i),
        SeedValue::Float(f) => SpannerValue::Float64(*f),
        SeedValue::String(s) => SpannerValue::String(s.clone()),
        structured => {
            SpannerValue::String(stringify(structured))
        }
    }
}

fn stringify(value: &SeedValue) -> String {
    match value {
        SeedValue::String(s) => s.clone(),
        SeedValue::Bool(b) => b.to_string(),
        SeedValue::Int(i) => i.to_string(),
        SeedValue::Float(f) => f.to_string(),
        SeedValue::Null => String::new(),
        structured => serde_json::to_string(&structured.to_json()).unwrap_or_default(),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
