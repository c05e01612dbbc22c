//! Error types for spanseed-core

use thiserror::Error;

/// Core error type for Spanseed
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Table identifier failed the allow-pattern
    #[error("[C004] Invalid table identifier '{name}': {reason}. {suggestion}")]
    InvalidIdentifier {
        name: String,
        reason: String,
        suggestion: String,
    },

    /// C005: Project/instance/database id failed validation
    #[error("[C005] Invalid {kind} id '{id}': {reason}. {suggestion}")]
    InvalidResourceId {
        kind: String,
        id: String,
        reason: String,
        suggestion: String,
    },

    /// C006: Seed path failed the traversal/extension/size allowlist
    #[error("[C006] Invalid seed path '{path}': {reason}. {suggestion}")]
    PathValidation {
        path: String,
        reason: String,
        suggestion: String,
    },

    /// C007: Mutation column/value lists differ in length
    #[error("[C007] Mutation for table '{table}' has {columns} columns but {values} values")]
    ColumnValueMismatch {
        table: String,
        columns: usize,
        values: usize,
    },

    /// C008: IO error
    #[error("[C008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C009: IO error with file path context
    #[error("[C009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C010: YAML parse error
    #[error("[C010] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
