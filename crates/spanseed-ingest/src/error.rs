//! Error types for spanseed-ingest

use thiserror::Error;

/// Seed ingestion errors.
///
/// Conversion and table-resolution problems are deliberately NOT errors:
/// they degrade to warnings so one malformed row does not sink a whole
/// seeding batch. Only unreadable/unparseable seed sources are fatal.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I001: Seed source missing or unreadable
    #[error("[I001] Failed to read seed source '{path}': {message}")]
    SeedRead { path: String, message: String },

    /// I002: Seed source is not valid YAML/JSON or not a mapping
    #[error("[I002] Failed to parse seed data '{path}': {message}")]
    SeedParse { path: String, message: String },

    /// I003: Fixture directory holds no usable files
    #[error("[I003] Fixture directory '{path}' contains no usable fixture files")]
    EmptyFixtureDir { path: String },

    /// Core validation error (path allowlist, identifiers)
    #[error(transparent)]
    Core(#[from] spanseed_core::CoreError),
}

/// Result type alias for IngestError
pub type IngestResult<T> = Result<T, IngestError>;
