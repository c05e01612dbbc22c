//! Client trait definitions

use crate::error::DbResult;
use async_trait::async_trait;
use spanseed_core::{DatabasePath, Mutation};
use std::sync::Arc;

/// A live client handle to one database.
///
/// Implementations must be Send + Sync; the pool hands the same handle to
/// one caller at a time but keeps handles for many databases alive
/// concurrently.
#[async_trait]
pub trait SpannerClient: Send + Sync {
    /// Lightweight connectivity round-trip, used by pool health checks.
    async fn ping(&self) -> DbResult<()>;

    /// Apply a batch of insert mutations atomically: all rows become
    /// visible together or not at all.
    async fn apply(&self, mutations: &[Mutation]) -> DbResult<()>;

    /// Execute a single read statement, returning raw cell values row by
    /// row in the store's REST encoding.
    async fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<serde_json::Value>>>;

    /// Fetch the database's current DDL statements.
    async fn get_ddl(&self) -> DbResult<Vec<String>>;

    /// Release server-side resources. Errors are reported but the handle
    /// is considered gone either way.
    async fn close(&self) -> DbResult<()>;
}

/// Creates clients on demand; the pool owns one factory and calls it
/// whenever a key needs a fresh connection.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, database: &DatabasePath) -> DbResult<Arc<dyn SpannerClient>>;
}
