//! Database manager façade
//!
//! One object composing schema extraction, the connection pool, and the
//! retry wrapper behind the operations the CLI needs: list tables, count
//! rows, apply mutations, query, summarize. Every operation acquires its
//! client through the pool inside the retry closure, so a handle evicted
//! as unhealthy is replaced on the next attempt.

use crate::error::{DbError, DbResult};
use crate::pool::ConnectionPool;
use crate::retry::{with_retry, RetryPolicy};
use spanseed_core::{escape_identifier, validate_table_identifier, DatabasePath, Mutation};
use spanseed_schema::{parse_ddl_statements, SchemaCache, SchemaMap, TableSchema};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

const LIST_TABLES_SQL: &str = "SELECT t.table_name FROM information_schema.tables AS t \
     WHERE t.table_catalog = '' AND t.table_schema = '' ORDER BY t.table_name";

/// Upper bound on table schemas kept resident between schema loads
const SCHEMA_CACHE_CAPACITY: usize = 100;

/// Per-table row count, with failures recorded inline instead of aborting
/// the whole summary.
#[derive(Debug, Clone)]
pub struct TableCount {
    pub table: String,
    pub rows: Option<i64>,
    pub error: Option<String>,
}

/// Aggregated row counts across all tables.
#[derive(Debug, Clone)]
pub struct TableSummary {
    pub tables: Vec<TableCount>,
    /// Sum over the tables that counted successfully
    pub total_rows: i64,
}

impl TableSummary {
    pub fn failed_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Façade over one target database.
pub struct DatabaseManager {
    pool: Arc<ConnectionPool>,
    database: DatabasePath,
    schema_cache: SchemaCache,
    quick_retry: RetryPolicy,
    database_retry: RetryPolicy,
    shutdown_rx: watch::Receiver<bool>,
    // Keeps the default (never-fired) shutdown channel alive
    _shutdown_tx: Option<watch::Sender<bool>>,
}

impl DatabaseManager {
    pub fn new(pool: Arc<ConnectionPool>, database: DatabasePath) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            pool,
            database,
            schema_cache: SchemaCache::with_capacity(SCHEMA_CACHE_CAPACITY),
            quick_retry: RetryPolicy::quick(),
            database_retry: RetryPolicy::database(),
            shutdown_rx: rx,
            _shutdown_tx: Some(tx),
        }
    }

    /// Use an external shutdown signal; retries in flight abort as soon as
    /// it fires.
    pub fn with_shutdown(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = shutdown_rx;
        self._shutdown_tx = None;
        self
    }

    /// Override the durable-operation retry profile.
    pub fn with_database_retry(mut self, policy: RetryPolicy) -> Self {
        self.database_retry = policy;
        self
    }

    pub fn database(&self) -> &DatabasePath {
        &self.database
    }

    /// List table names from the system catalog.
    pub async fn list_tables(&self) -> DbResult<Vec<String>> {
        let rows = self.query(LIST_TABLES_SQL).await?;
        rows.into_iter()
            .map(|row| {
                row.first()
                    .and_then(|cell| cell.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| DbError::Decode("table name cell is not a string".to_string()))
            })
            .collect()
    }

    /// Count rows in one table. The name is validated against the
    /// identifier allowlist and escaped before interpolation.
    pub async fn table_row_count(&self, table: &str) -> DbResult<i64> {
        validate_table_identifier(table)?;
        let sql = format!("SELECT COUNT(*) FROM `{}`", escape_identifier(table));
        let rows = self.query(&sql).await?;
        let cell = rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| DbError::Decode("count query returned no rows".to_string()))?;
        decode_int64(cell)
            .ok_or_else(|| DbError::Decode(format!("count cell is not an INT64: {}", cell)))
    }

    /// Apply a batch of insert mutations atomically, retrying transient
    /// failures with the database profile. Empty input is a no-op success,
    /// and `AlreadyExists` is swallowed so re-seeding the same scenario is
    /// idempotent. Returns the number of mutations in the batch.
    pub async fn apply_mutations(&self, mutations: &[Mutation]) -> DbResult<usize> {
        if mutations.is_empty() {
            return Ok(0);
        }

        let pool = Arc::clone(&self.pool);
        let database = self.database.clone();
        with_retry(
            "apply_mutations",
            &self.database_retry,
            self.shutdown_rx.clone(),
            move || {
                let pool = Arc::clone(&pool);
                let database = database.clone();
                async move {
                    let client = pool.get(&database).await?;
                    match client.apply(mutations).await {
                        Err(DbError::AlreadyExists(message)) => {
                            log::warn!(
                                "rows already exist, treating apply as success: {}",
                                message
                            );
                            Ok(())
                        }
                        other => other,
                    }
                }
            },
        )
        .await?;

        Ok(mutations.len())
    }

    /// Execute a single read statement with the quick retry profile.
    pub async fn query(&self, sql: &str) -> DbResult<Vec<Vec<serde_json::Value>>> {
        let pool = Arc::clone(&self.pool);
        let database = self.database.clone();
        let sql = sql.to_string();
        with_retry(
            "query",
            &self.quick_retry,
            self.shutdown_rx.clone(),
            move || {
                let pool = Arc::clone(&pool);
                let database = database.clone();
                let sql = sql.clone();
                async move {
                    let client = pool.get(&database).await?;
                    client.query_rows(&sql).await
                }
            },
        )
        .await
    }

    /// Row counts for every table, tolerating per-table failures by
    /// recording them inline.
    pub async fn table_summary(&self) -> DbResult<TableSummary> {
        let tables = self.list_tables().await?;
        let mut summary = TableSummary {
            tables: Vec::with_capacity(tables.len()),
            total_rows: 0,
        };

        for table in tables {
            match self.table_row_count(&table).await {
                Ok(rows) => {
                    summary.total_rows += rows;
                    summary.tables.push(TableCount {
                        table,
                        rows: Some(rows),
                        error: None,
                    });
                }
                Err(e) => {
                    log::warn!("row count for {} failed: {}", table, e);
                    summary.tables.push(TableCount {
                        table,
                        rows: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Load the schema map, either from a migration directory or from the
    /// live database's DDL, refreshing the bounded schema cache.
    pub async fn load_schema(&self, migration_dir: Option<&Path>) -> DbResult<SchemaMap> {
        let schema = if let Some(dir) = migration_dir {
            spanseed_schema::load_schema_from_dir(dir)?
        } else {
            let pool = Arc::clone(&self.pool);
            let database = self.database.clone();
            let statements = with_retry(
                "get_ddl",
                &self.quick_retry,
                self.shutdown_rx.clone(),
                move || {
                    let pool = Arc::clone(&pool);
                    let database = database.clone();
                    async move {
                        let client = pool.get(&database).await?;
                        client.get_ddl().await
                    }
                },
            )
            .await?;
            parse_ddl_statements(&statements)
        };

        for (table, columns) in &schema {
            self.schema_cache.set(table.clone(), columns.clone());
        }
        Ok(schema)
    }

    /// Cached schema for one table, if a load has seen it.
    pub fn table_schema(&self, table: &str) -> Option<TableSchema> {
        self.schema_cache.get(table)
    }

    /// Snapshot of every cached table schema.
    pub fn cached_schema(&self) -> SchemaMap {
        self.schema_cache.get_all()
    }
}

/// The REST surface encodes INT64 cells as decimal strings; plain numbers
/// show up from mocks and future transports.
fn decode_int64(cell: &serde_json::Value) -> Option<i64> {
    match cell {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
