//! Bounded connection pool
//!
//! Keys connections by full database path, bounds the total across all
//! keys, health-checks idle handles before reuse, and runs a background
//! cleanup task that evicts idle and over-age entries. The pool is an
//! explicitly constructed object with an explicit `close()`; nothing here
//! is global state.
//!
//! Locking rule: the inner mutex is never held across an await. Health
//! checks and client closes happen after the relevant entry has been
//! marked in-use or removed under the lock.

use crate::client::{ClientFactory, SpannerClient};
use crate::error::{DbError, DbResult};
use spanseed_core::config::PoolSettings;
use spanseed_core::DatabasePath;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

/// Pool tuning knobs
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Hard cap on live connections across all database keys
    pub max_connections: usize,

    /// Idle entries older than this are removed by cleanup
    pub idle_timeout: Duration,

    /// Entries older than this are removed by cleanup regardless of use
    /// pattern, bounding session staleness
    pub max_lifetime: Duration,

    /// Cleanup cadence
    pub cleanup_interval: Duration,

    /// Bound on the health-check round trip
    pub health_check_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(600),
            cleanup_interval: Duration::from_secs(60),
            health_check_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&PoolSettings> for PoolConfig {
    fn from(settings: &PoolSettings) -> Self {
        Self {
            max_connections: settings.max_connections,
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
            max_lifetime: Duration::from_secs(settings.max_lifetime_secs),
            cleanup_interval: Duration::from_secs(settings.cleanup_interval_secs),
            health_check_timeout: Duration::from_secs(settings.health_check_timeout_secs),
        }
    }
}

/// Read-only snapshot of pool occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub total: usize,
    pub active: usize,
    pub idle: usize,
    pub max: usize,
}

struct PoolEntry {
    id: u64,
    client: Arc<dyn SpannerClient>,
    created_at: Instant,
    last_used: Instant,
    in_use: bool,
    use_count: u64,
}

struct PoolInner {
    /// database path → connections for that database
    entries: HashMap<String, Vec<PoolEntry>>,
    /// Connections being created right now; counted against the cap so a
    /// burst of acquisitions cannot overshoot it
    creating: usize,
    next_id: u64,
}

impl PoolInner {
    fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    fn remove(&mut self, key: &str, id: u64) -> Option<PoolEntry> {
        let list = self.entries.get_mut(key)?;
        let pos = list.iter().position(|e| e.id == id)?;
        let entry = list.remove(pos);
        if list.is_empty() {
            self.entries.remove(key);
        }
        Some(entry)
    }
}

struct PoolShared {
    inner: Mutex<PoolInner>,
    factory: Arc<dyn ClientFactory>,
    config: PoolConfig,
}

/// Bounded, health-checked connection pool.
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
    shutdown_tx: watch::Sender<bool>,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionPool {
    /// Create a pool and start its background cleanup task.
    pub fn new(factory: Arc<dyn ClientFactory>, config: PoolConfig) -> Self {
        let shared = Arc::new(PoolShared {
            inner: Mutex::new(PoolInner {
                entries: HashMap::new(),
                creating: 0,
                next_id: 0,
            }),
            factory,
            config,
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task_shared = Arc::clone(&shared);
        let cleanup = tokio::spawn(cleanup_task(task_shared, shutdown_rx));

        Self {
            shared,
            shutdown_tx,
            cleanup: Mutex::new(Some(cleanup)),
        }
    }

    /// Acquire a connection for `database`: reuse a healthy idle entry,
    /// evict the globally-oldest idle entry under capacity pressure, or
    /// create a fresh client. Fails with `PoolExhausted` when the pool is
    /// full and every entry is in use.
    pub async fn get(&self, database: &DatabasePath) -> DbResult<PooledClient> {
        let key = database.to_string();

        // Reuse path: claim idle entries one at a time and health-check
        // them outside the lock
        loop {
            let claimed = {
                let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
                match inner.entries.get_mut(&key).and_then(|list| {
                    list.iter_mut().find(|e| !e.in_use)
                }) {
                    Some(entry) => {
                        entry.in_use = true;
                        Some((entry.id, Arc::clone(&entry.client)))
                    }
                    None => None,
                }
            };

            let Some((id, client)) = claimed else {
                break;
            };

            match timeout(self.shared.config.health_check_timeout, client.ping()).await {
                Ok(Ok(())) => {
                    let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
                    if let Some(list) = inner.entries.get_mut(&key) {
                        if let Some(entry) = list.iter_mut().find(|e| e.id == id) {
                            entry.use_count += 1;
                            entry.last_used = Instant::now();
                        }
                    }
                    log::debug!("reusing pooled connection for {}", key);
                    return Ok(PooledClient {
                        shared: Arc::clone(&self.shared),
                        key,
                        id,
                        client,
                        released: false,
                    });
                }
                outcome => {
                    let reason = match outcome {
                        Ok(Err(e)) => e.to_string(),
                        _ => "health check timed out".to_string(),
                    };
                    log::warn!("evicting unhealthy connection for {}: {}", key, reason);
                    let removed = {
                        let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
                        inner.remove(&key, id)
                    };
                    if let Some(entry) = removed {
                        let _ = entry.client.close().await;
                    }
                    // Try the next idle entry, if any
                }
            }
        }

        // Creation path: make room if needed and reserve the slot in one
        // critical section, so concurrent acquirers cannot overshoot the cap
        let evicted = {
            let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
            let evicted = if inner.total() + inner.creating >= self.shared.config.max_connections {
                // Globally-oldest idle entry across all keys
                let oldest = inner
                    .entries
                    .iter()
                    .flat_map(|(k, list)| {
                        list.iter()
                            .filter(|e| !e.in_use)
                            .map(move |e| (k.clone(), e.id, e.last_used))
                    })
                    .min_by_key(|(_, _, last_used)| *last_used);

                match oldest {
                    Some((evict_key, evict_id, _)) => {
                        let entry = inner.remove(&evict_key, evict_id);
                        entry.map(|e| (evict_key, e))
                    }
                    None => {
                        return Err(DbError::PoolExhausted {
                            max: self.shared.config.max_connections,
                        });
                    }
                }
            } else {
                None
            };
            inner.creating += 1;
            evicted
        };
        if let Some((evict_key, entry)) = evicted {
            log::debug!("evicting oldest idle connection for {}", evict_key);
            let _ = entry.client.close().await;
        }

        let connected = self.shared.factory.connect(database).await;
        let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
        inner.creating -= 1;
        let client = connected?;

        let id = inner.next_id;
        inner.next_id += 1;
        let now = Instant::now();
        inner.entries.entry(key.clone()).or_default().push(PoolEntry {
            id,
            client: Arc::clone(&client),
            created_at: now,
            last_used: now,
            in_use: true,
            use_count: 1,
        });
        log::debug!("created connection {} for {}", id, key);

        Ok(PooledClient {
            shared: Arc::clone(&self.shared),
            key,
            id,
            client,
            released: false,
        })
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> PoolStats {
        let inner = self.shared.inner.lock().expect("pool mutex poisoned");
        let total = inner.total();
        let active = inner
            .entries
            .values()
            .flat_map(|list| list.iter())
            .filter(|e| e.in_use)
            .count();
        PoolStats {
            total,
            active,
            idle: total - active,
            max: self.shared.config.max_connections,
        }
    }

    /// Stop the cleanup task, then close and remove every entry, in-use
    /// ones included. The task is joined before the map is drained so the
    /// two cannot race.
    pub async fn close(&self) {
        let _ = self.shutdown_tx.send(true);
        let handle = {
            let mut cleanup = self.cleanup.lock().expect("pool cleanup mutex poisoned");
            cleanup.take()
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let drained: Vec<PoolEntry> = {
            let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
            inner.entries.drain().flat_map(|(_, list)| list).collect()
        };
        for entry in drained {
            let _ = entry.client.close().await;
        }
        log::debug!("connection pool closed");
    }
}

/// Guard over an acquired connection. Dropping it releases the entry back
/// to the pool; `release()` does the same explicitly.
pub struct PooledClient {
    shared: Arc<PoolShared>,
    key: String,
    id: u64,
    client: Arc<dyn SpannerClient>,
    released: bool,
}

impl std::fmt::Debug for PooledClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledClient")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl PooledClient {
    pub fn client(&self) -> &Arc<dyn SpannerClient> {
        &self.client
    }

    /// How many times this entry has been handed out, this acquisition
    /// included.
    pub fn use_count(&self) -> u64 {
        let inner = self.shared.inner.lock().expect("pool mutex poisoned");
        inner
            .entries
            .get(&self.key)
            .and_then(|list| list.iter().find(|e| e.id == self.id))
            .map(|e| e.use_count)
            .unwrap_or(0)
    }

    /// Mark the entry idle and stamp its last-used time. The underlying
    /// handle stays open for reuse.
    pub fn release(mut self) {
        self.mark_released();
    }

    fn mark_released(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut inner = self.shared.inner.lock().expect("pool mutex poisoned");
        if let Some(list) = inner.entries.get_mut(&self.key) {
            if let Some(entry) = list.iter_mut().find(|e| e.id == self.id) {
                entry.in_use = false;
                entry.last_used = Instant::now();
            }
        }
    }
}

impl std::ops::Deref for PooledClient {
    type Target = dyn SpannerClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref()
    }
}

impl Drop for PooledClient {
    fn drop(&mut self) {
        self.mark_released();
    }
}

/// Periodically evict idle and over-age entries until shutdown.
async fn cleanup_task(shared: Arc<PoolShared>, mut shutdown_rx: watch::Receiver<bool>) {
    let mut tick = interval(shared.config.cleanup_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of a tokio interval fires immediately
    tick.tick().await;

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A dropped sender means the pool is gone; stop either way
                if changed.is_err() || *shutdown_rx.borrow() {
                    log::debug!("pool cleanup task shutting down");
                    break;
                }
            }
            _ = tick.tick() => {
                let expired = collect_expired(&shared);
                for entry in expired {
                    let _ = entry.client.close().await;
                }
            }
        }
    }
}

fn collect_expired(shared: &PoolShared) -> Vec<PoolEntry> {
    let now = Instant::now();
    let config = &shared.config;
    let mut inner = shared.inner.lock().expect("pool mutex poisoned");

    let to_remove: Vec<(String, u64)> = inner
        .entries
        .iter()
        .flat_map(|(key, list)| {
            list.iter()
                .filter(|e| !e.in_use)
                .filter(|e| {
                    now.duration_since(e.last_used) > config.idle_timeout
                        || now.duration_since(e.created_at) > config.max_lifetime
                })
                .map(move |e| (key.clone(), e.id))
        })
        .collect();

    let mut expired = Vec::new();
    for (key, id) in to_remove {
        if let Some(entry) = inner.remove(&key, id) {
            log::debug!(
                "cleanup evicting connection {} for {} (idle {:?}, age {:?})",
                entry.id,
                key,
                now.duration_since(entry.last_used),
                now.duration_since(entry.created_at)
            );
            expired.push(entry);
        }
    }

    expired
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
