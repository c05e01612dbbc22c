//! Loosely-typed seed values and their typed Spanner counterparts
//!
//! Seed files are arbitrary JSON-shaped documents. Rather than passing
//! `serde_yaml::Value` around, the ingestion pipeline works on an explicit
//! tagged union (`SeedValue`) whose map variant preserves document order,
//! and converts it into the typed `SpannerValue` representation a column
//! expects.

use chrono::{DateTime, SecondsFormat, Utc};

/// A single seed row: ordered column → value pairs.
pub type SeedRecord = Vec<(String, SeedValue)>;

/// Parsed seed data: ordered seed key → value, where the value is expected
/// to be one row (a map) or many rows (a list of maps). Shape is checked at
/// mutation-building time, not here.
pub type SeedData = Vec<(String, SeedValue)>;

/// Tagged union over every value shape a seed file can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<SeedValue>),
    Map(Vec<(String, SeedValue)>),
}

impl SeedValue {
    /// Build a `SeedValue` from a parsed YAML (or JSON) document,
    /// preserving mapping order.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => SeedValue::Null,
            serde_yaml::Value::Bool(b) => SeedValue::Bool(*b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SeedValue::Int(i)
                } else {
                    SeedValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_yaml::Value::String(s) => SeedValue::String(s.clone()),
            serde_yaml::Value::Sequence(items) => {
                SeedValue::List(items.iter().map(Self::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => SeedValue::Map(
                map.iter()
                    .map(|(k, v)| (yaml_key_to_string(k), Self::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    /// Short type name for warnings.
    pub fn type_name(&self) -> &'static str {
        match self {
            SeedValue::Null => "null",
            SeedValue::Bool(_) => "bool",
            SeedValue::Int(_) => "int",
            SeedValue::Float(_) => "float",
            SeedValue::String(_) => "string",
            SeedValue::List(_) => "list",
            SeedValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SeedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SeedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a `serde_json::Value`, used when a structured value must
    /// be serialized into a JSON column.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SeedValue::Null => serde_json::Value::Null,
            SeedValue::Bool(b) => serde_json::Value::Bool(*b),
            SeedValue::Int(i) => serde_json::Value::from(*i),
            SeedValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SeedValue::String(s) => serde_json::Value::String(s.clone()),
            SeedValue::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            SeedValue::Map(pairs) => serde_json::Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn yaml_key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        other => format!("{:?}", other),
    }
}

/// A value coerced to a column's declared storage type, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum SpannerValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Json(String),
    StringArray(Vec<String>),
    Int64Array(Vec<i64>),
}

impl SpannerValue {
    /// Encode for the Spanner REST surface: INT64 travels as a decimal
    /// string, TIMESTAMP as RFC 3339 with a `Z` suffix, arrays as JSON
    /// arrays of the element encoding.
    pub fn to_rest_json(&self) -> serde_json::Value {
        match self {
            SpannerValue::Null => serde_json::Value::Null,
            SpannerValue::Bool(b) => serde_json::Value::Bool(*b),
            SpannerValue::Int64(i) => serde_json::Value::String(i.to_string()),
            SpannerValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            SpannerValue::String(s) => serde_json::Value::String(s.clone()),
            SpannerValue::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            SpannerValue::Json(s) => serde_json::Value::String(s.clone()),
            SpannerValue::StringArray(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            SpannerValue::Int64Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|i| serde_json::Value::String(i.to_string()))
                    .collect(),
            ),
        }
    }
}
