//! Error types for spanseed-schema

use thiserror::Error;

/// Schema extraction errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// P001: Schema source missing or unreadable
    #[error("[P001] Failed to read schema source '{path}': {message}")]
    SchemaRead { path: String, message: String },

    /// P002: Directory yielded no usable DDL
    #[error("[P002] No migration files found in '{path}'")]
    NoMigrationFiles { path: String },
}

/// Result type alias for SchemaError
pub type SchemaResult<T> = Result<T, SchemaError>;
