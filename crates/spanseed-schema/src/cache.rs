//! Bounded LRU cache for table schemas
//!
//! Schema maps are rebuilt whenever DDL is re-read, and E2E suites cycle
//! through many scenario databases, so the cache puts a hard cap on how
//! many table schemas stay resident.

use crate::types::{SchemaMap, TableSchema};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Fixed-capacity table → schema cache with least-recently-used eviction.
///
/// Both `get` hits and `set` overwrites promote the entry to
/// most-recently-used. All operations are safe for concurrent callers; a
/// single mutex guards the map and the recency order together.
pub struct SchemaCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    map: HashMap<String, TableSchema>,
    /// Front = least recently used, back = most recently used
    order: VecDeque<String>,
}

impl SchemaCache {
    /// Create a cache holding at most `capacity` table schemas.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "SchemaCache capacity must be at least 1");
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    /// Insert or replace a table schema. Inserting a new key at capacity
    /// evicts the least-recently-used entry first.
    pub fn set(&self, table: impl Into<String>, schema: TableSchema) {
        let table = table.into();
        let mut inner = self.inner.lock().expect("schema cache mutex poisoned");

        if inner.map.contains_key(&table) {
            inner.map.insert(table.clone(), schema);
            promote(&mut inner.order, &table);
            return;
        }

        if inner.map.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.map.remove(&evicted);
                log::debug!("schema cache evicted '{}'", evicted);
            }
        }
        inner.order.push_back(table.clone());
        inner.map.insert(table, schema);
    }

    /// Look up a table schema; a hit promotes the entry.
    pub fn get(&self, table: &str) -> Option<TableSchema> {
        let mut inner = self.inner.lock().expect("schema cache mutex poisoned");
        let schema = inner.map.get(table).cloned()?;
        promote(&mut inner.order, table);
        Some(schema)
    }

    /// Snapshot of every cached entry.
    pub fn get_all(&self) -> SchemaMap {
        let inner = self.inner.lock().expect("schema cache mutex poisoned");
        inner.map.clone()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("schema cache mutex poisoned");
        inner.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn promote(order: &mut VecDeque<String>, table: &str) {
    if let Some(pos) = order.iter().position(|t| t == table) {
        order.remove(pos);
    }
    order.push_back(table.to_string());
}
