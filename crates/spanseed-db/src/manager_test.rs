use super::*;
use crate::pool::PoolConfig;
use crate::testutil::{test_db, MockClient, MockFactory};
use spanseed_core::value::SpannerValue;
use std::sync::Arc;

fn mutation(table: &str, id: &str) -> Mutation {
    Mutation::insert(
        table,
        vec!["UserID".to_string()],
        vec![SpannerValue::String(id.to_string())],
    )
    .unwrap()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(5),
        multiplier: 2.0,
        jitter: 0.0,
    }
}

/// Manager wired to one scripted client.
fn manager_with(client: Arc<MockClient>) -> (DatabaseManager, Arc<ConnectionPool>) {
    let factory = MockFactory::new();
    factory.push_client(client);
    let pool = Arc::new(ConnectionPool::new(factory, PoolConfig::default()));
    let manager = DatabaseManager::new(Arc::clone(&pool), test_db(1))
        .with_database_retry(fast_retry());
    (manager, pool)
}

#[tokio::test]
async fn test_apply_empty_is_noop_success() {
    let client = MockClient::healthy();
    let (manager, pool) = manager_with(Arc::clone(&client));

    let applied = manager.apply_mutations(&[]).await.unwrap();
    assert_eq!(applied, 0);
    // No client was ever acquired
    assert_eq!(pool.stats().total, 0);

    pool.close().await;
}

#[tokio::test]
async fn test_apply_batch() {
    let client = MockClient::healthy();
    let (manager, pool) = manager_with(Arc::clone(&client));

    let batch = vec![mutation("Users", "u1"), mutation("Users", "u2")];
    let applied = manager.apply_mutations(&batch).await.unwrap();

    assert_eq!(applied, 2);
    assert_eq!(client.applied_batches(), 1);
    assert_eq!(client.applied.lock().unwrap()[0].len(), 2);

    pool.close().await;
}

#[tokio::test]
async fn test_apply_swallows_already_exists() {
    let client = MockClient::healthy();
    client.push_apply_error(DbError::AlreadyExists("Users(u1)".to_string()));
    let (manager, pool) = manager_with(Arc::clone(&client));

    let batch = vec![mutation("Users", "u1")];
    // Re-seeding the same rows is success, not failure
    let applied = manager.apply_mutations(&batch).await.unwrap();
    assert_eq!(applied, 1);

    pool.close().await;
}

#[tokio::test]
async fn test_apply_retries_transient_then_succeeds() {
    let client = MockClient::healthy();
    let transient = || DbError::Transient {
        status: "UNAVAILABLE".to_string(),
        message: "down".to_string(),
    };
    client.push_apply_error(transient());
    client.push_apply_error(transient());
    let (manager, pool) = manager_with(Arc::clone(&client));

    let batch = vec![mutation("Users", "u1")];
    let applied = manager.apply_mutations(&batch).await.unwrap();
    assert_eq!(applied, 1);
    assert_eq!(client.applied_batches(), 1);

    pool.close().await;
}

#[tokio::test]
async fn test_apply_fatal_error_propagates() {
    let client = MockClient::healthy();
    client.push_apply_error(DbError::Execution("bad table".to_string()));
    let (manager, pool) = manager_with(Arc::clone(&client));

    let batch = vec![mutation("Users", "u1")];
    let err = manager.apply_mutations(&batch).await.unwrap_err();
    assert!(matches!(err, DbError::Execution(_)));

    pool.close().await;
}

#[tokio::test]
async fn test_list_tables() {
    let client = MockClient::healthy();
    client.push_query_rows(vec![
        vec![serde_json::json!("Orders")],
        vec![serde_json::json!("Users")],
    ]);
    let (manager, pool) = manager_with(Arc::clone(&client));

    let tables = manager.list_tables().await.unwrap();
    assert_eq!(tables, vec!["Orders".to_string(), "Users".to_string()]);

    pool.close().await;
}

#[tokio::test]
async fn test_table_row_count_decodes_string_cell() {
    let client = MockClient::healthy();
    client.push_query_rows(vec![vec![serde_json::json!("5")]]);
    let (manager, pool) = manager_with(Arc::clone(&client));

    let count = manager.table_row_count("Users").await.unwrap();
    assert_eq!(count, 5);

    pool.close().await;
}

#[tokio::test]
async fn test_table_row_count_rejects_injection() {
    let client = MockClient::healthy();
    let (manager, pool) = manager_with(Arc::clone(&client));

    let err = manager
        .table_row_count("Users; DROP TABLE Users")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Core(spanseed_core::CoreError::InvalidIdentifier { .. })
    ));
    // Validation failed before any query went out
    assert!(client.query_responses.lock().unwrap().is_empty());

    pool.close().await;
}

#[tokio::test]
async fn test_table_summary_tolerates_per_table_failures() {
    let client = MockClient::healthy();
    client.push_query_rows(vec![
        vec![serde_json::json!("A")],
        vec![serde_json::json!("B")],
    ]);
    client.push_query_rows(vec![vec![serde_json::json!("2")]]);
    client.push_query_error(DbError::Execution("table B is broken".to_string()));
    let (manager, pool) = manager_with(Arc::clone(&client));

    let summary = manager.table_summary().await.unwrap();
    assert_eq!(summary.tables.len(), 2);
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.failed_tables(), 1);
    assert_eq!(summary.tables[0].rows, Some(2));
    assert!(summary.tables[1].error.is_some());

    pool.close().await;
}

#[tokio::test]
async fn test_load_schema_from_live_ddl() {
    let client = MockClient::healthy();
    *client.ddl.lock().unwrap() = vec![
        "CREATE TABLE Users (UserID STRING(36), Age INT64) PRIMARY KEY (UserID)".to_string(),
    ];
    let (manager, pool) = manager_with(Arc::clone(&client));

    let schema = manager.load_schema(None).await.unwrap();
    assert_eq!(schema.len(), 1);
    assert!(schema["Users"].contains_key("Age"));

    // The load refreshed the schema cache
    assert!(manager.table_schema("Users").is_some());
    assert!(manager.table_schema("Orders").is_none());
    assert_eq!(manager.cached_schema().len(), 1);

    pool.close().await;
}

#[tokio::test]
async fn test_load_schema_from_migration_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("001_init.sql"),
        "CREATE TABLE Events (EventID STRING(36)) PRIMARY KEY (EventID);",
    )
    .unwrap();

    let client = MockClient::healthy();
    let (manager, pool) = manager_with(Arc::clone(&client));

    let schema = manager.load_schema(Some(dir.path())).await.unwrap();
    assert!(schema.contains_key("Events"));

    pool.close().await;
}
