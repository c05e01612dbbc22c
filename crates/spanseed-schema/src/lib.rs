//! spanseed-schema - DDL schema extraction for Spanseed
//!
//! This crate turns raw DDL text into a per-table column→type map, caches
//! those maps in a bounded LRU structure, and resolves loosely-spelled seed
//! keys to actual schema table names.

pub mod cache;
pub mod error;
pub mod parser;
pub mod resolve;
pub mod types;

pub use cache::SchemaCache;
pub use error::{SchemaError, SchemaResult};
pub use parser::{load_schema_from_dir, parse_ddl_statements, read_ddl_dir};
pub use resolve::resolve_table_name;
pub use types::{ColumnType, SchemaMap, TableSchema};
