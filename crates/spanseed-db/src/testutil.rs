//! Shared mock client and factory for pool/retry/manager tests

use crate::client::{ClientFactory, SpannerClient};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use spanseed_core::{DatabasePath, Mutation};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Scriptable in-memory client.
#[derive(Default)]
pub(crate) struct MockClient {
    pub healthy: AtomicBool,
    pub pings: AtomicU32,
    pub closed: AtomicBool,
    pub applied: Mutex<Vec<Vec<Mutation>>>,
    /// Errors popped one per `apply` call before the call succeeds
    pub apply_errors: Mutex<VecDeque<DbError>>,
    /// Responses popped one per `query_rows` call
    pub query_responses: Mutex<VecDeque<DbResult<Vec<Vec<serde_json::Value>>>>>,
    pub ddl: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn healthy() -> Arc<Self> {
        let client = Self::default();
        client.healthy.store(true, Ordering::SeqCst);
        Arc::new(client)
    }

    pub fn push_query_rows(&self, rows: Vec<Vec<serde_json::Value>>) {
        self.query_responses
            .lock()
            .unwrap()
            .push_back(Ok(rows));
    }

    pub fn push_query_error(&self, error: DbError) {
        self.query_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn push_apply_error(&self, error: DbError) {
        self.apply_errors.lock().unwrap().push_back(error);
    }

    pub fn applied_batches(&self) -> usize {
        self.applied.lock().unwrap().len()
    }
}

#[async_trait]
impl SpannerClient for MockClient {
    async fn ping(&self) -> DbResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::Unhealthy("mock marked unhealthy".to_string()))
        }
    }

    async fn apply(&self, mutations: &[Mutation]) -> DbResult<()> {
        if let Some(error) = self.apply_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.applied.lock().unwrap().push(mutations.to_vec());
        Ok(())
    }

    async fn query_rows(&self, _sql: &str) -> DbResult<Vec<Vec<serde_json::Value>>> {
        match self.query_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(Vec::new()),
        }
    }

    async fn get_ddl(&self) -> DbResult<Vec<String>> {
        Ok(self.ddl.lock().unwrap().clone())
    }

    async fn close(&self) -> DbResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory handing out scripted clients, falling back to fresh healthy
/// mocks once the script runs dry.
#[derive(Default)]
pub(crate) struct MockFactory {
    pub connects: AtomicU32,
    pub scripted: Mutex<VecDeque<Arc<MockClient>>>,
    pub fail_connects: AtomicBool,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_client(&self, client: Arc<MockClient>) {
        self.scripted.lock().unwrap().push_back(client);
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn connect(&self, database: &DatabasePath) -> DbResult<Arc<dyn SpannerClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connects.load(Ordering::SeqCst) {
            return Err(DbError::Connection {
                database: database.to_string(),
                message: "mock connect failure".to_string(),
            });
        }
        let client = match self.scripted.lock().unwrap().pop_front() {
            Some(client) => client,
            None => MockClient::healthy(),
        };
        Ok(client)
    }
}

pub(crate) fn test_db(n: u32) -> DatabasePath {
    DatabasePath::new("test-project", "test-instance", format!("db-{}", n))
        .expect("valid test database path")
}
