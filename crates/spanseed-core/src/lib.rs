//! spanseed-core - Core library for Spanseed
//!
//! This crate provides the shared types (seed values, mutations, database
//! paths), configuration parsing, and input validation used across all
//! Spanseed components.

pub mod config;
pub mod database_path;
pub mod error;
pub mod mutation;
pub mod validation;
pub mod value;

pub use config::{Config, PoolSettings, RetrySettings};
pub use database_path::DatabasePath;
pub use error::{CoreError, CoreResult};
pub use mutation::Mutation;
pub use validation::{escape_identifier, validate_seed_path, validate_table_identifier};
pub use value::{SeedData, SeedRecord, SeedValue, SpannerValue};
