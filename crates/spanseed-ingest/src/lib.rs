//! spanseed-ingest - Seed-data ingestion for Spanseed
//!
//! Turns loosely-typed seed records into type-correct insert mutations:
//! per-column value coercion against the extracted schema, tolerant
//! table-name reconciliation, and two seed-source adapters (single seed
//! file, fixture directory) behind one trait.

pub mod builder;
pub mod convert;
pub mod error;
pub mod source;

pub use builder::{build_insert, count_by_table, AutoMutationBuilder};
pub use convert::convert_value;
pub use error::{IngestError, IngestResult};
pub use source::{FixtureDirSource, SeedFileSource, SeedSource};
