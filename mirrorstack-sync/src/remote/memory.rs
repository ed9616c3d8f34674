//! In-process remote store.
//!
//! Keeps every collection in a `BTreeMap` and fans change events out to the
//! attached feeds. Used by the test suite and by embedders that have no
//! backend yet. Also exposes out-of-band writes (`seed`, `remove`) that
//! simulate other clients, and failure switches for exercising error paths.

use super::{ChangeFeed, RemoteStore};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use mirrorstack_model::{AuthPersistence, AuthState, ChangeEvent, Fields};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemoryInner {
    collections: HashMap<String, BTreeMap<String, Value>>,
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<ChangeEvent>>>,
    persistence: AuthPersistence,
    read_delay: Duration,
    rejected_ids: HashSet<String>,
}

impl MemoryInner {
    fn broadcast(&mut self, path: &str, event: ChangeEvent) {
        if let Some(subscribers) = self.subscribers.get_mut(path) {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn put(&mut self, path: &str, id: &str, value: Value) {
        let previous = self
            .collections
            .entry(path.to_string())
            .or_default()
            .insert(id.to_string(), value.clone());
        let event = match previous {
            Some(_) => ChangeEvent::Changed {
                key: id.to_string(),
                value,
            },
            None => ChangeEvent::Added {
                key: id.to_string(),
                value,
            },
        };
        self.broadcast(path, event);
    }

    fn take(&mut self, path: &str, id: &str) -> Option<Value> {
        let removed = self.collections.get_mut(path)?.remove(id)?;
        self.broadcast(
            path,
            ChangeEvent::Removed {
                key: id.to_string(),
            },
        );
        Some(removed)
    }
}

fn collection_key(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}

/// An in-memory [`RemoteStore`].
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    auth: watch::Sender<AuthState>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with no authenticated session.
    pub fn new() -> Self {
        let (auth, _) = watch::channel(AuthState::None);
        Self {
            inner: Mutex::new(MemoryInner::default()),
            auth,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Replaces a child's value as another client would.
    pub async fn seed(&self, path: &str, id: &str, value: Value) {
        self.inner.lock().await.put(&collection_key(path), id, value);
    }

    /// Removes a child as another client would.
    pub async fn remove(&self, path: &str, id: &str) -> Option<Value> {
        self.inner.lock().await.take(&collection_key(path), id)
    }

    /// Reads one child.
    pub async fn get(&self, path: &str, id: &str) -> Option<Value> {
        let inner = self.inner.lock().await;
        inner
            .collections
            .get(&collection_key(path))
            .and_then(|c| c.get(id))
            .cloned()
    }

    /// Copies a whole collection.
    pub async fn records(&self, path: &str) -> BTreeMap<String, Value> {
        let inner = self.inner.lock().await;
        inner
            .collections
            .get(&collection_key(path))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of feeds attached to a collection.
    pub async fn subscriber_count(&self, path: &str) -> usize {
        let inner = self.inner.lock().await;
        inner
            .subscribers
            .get(&collection_key(path))
            .map(|s| s.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// The persistence most recently requested.
    pub async fn persistence(&self) -> AuthPersistence {
        self.inner.lock().await.persistence
    }

    /// Delays every snapshot read.
    pub async fn set_read_delay(&self, delay: Duration) {
        self.inner.lock().await.read_delay = delay;
    }

    /// Starts an authenticated session.
    pub fn sign_in(&self, uid: impl Into<String>) {
        self.auth
            .send_replace(AuthState::Authenticated { uid: uid.into() });
    }

    /// Ends the session.
    pub fn sign_out(&self) {
        self.auth.send_replace(AuthState::None);
    }

    /// Makes snapshot reads and feed attachment fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes writes and deletes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes writes and deletes of one child id fail, in every collection.
    pub async fn reject_writes_to(&self, id: impl Into<String>) {
        self.inner.lock().await.rejected_ids.insert(id.into());
    }

    fn check_reads(&self, path: &str) -> SyncResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Upstream(format!("read of {path} rejected")));
        }
        Ok(())
    }

    fn check_writes(&self, inner: &MemoryInner, path: &str, id: &str) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) || inner.rejected_ids.contains(id) {
            return Err(SyncError::Upstream(format!("write to {path}/{id} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn read_ordered(&self, path: &str) -> SyncResult<Vec<(String, Value)>> {
        self.check_reads(path)?;
        let delay = self.inner.lock().await.read_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(&collection_key(path))
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn subscribe(&self, path: &str, start_at: Option<&str>) -> SyncResult<ChangeFeed> {
        self.check_reads(path)?;
        let path = collection_key(path);
        let (tx, feed) = ChangeFeed::channel();

        let mut inner = self.inner.lock().await;
        if let Some(collection) = inner.collections.get(&path) {
            let replay = match start_at {
                Some(start) => collection.range(start.to_string()..),
                None => collection.range::<String, _>(..),
            };
            for (key, value) in replay {
                let _ = tx.send(ChangeEvent::Added {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        inner.subscribers.entry(path.clone()).or_default().push(tx);
        debug!("Feed attached to {} (start_at={:?})", path, start_at);

        Ok(feed)
    }

    async fn write(&self, path: &str, id: &str, fields: Fields) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        self.check_writes(&inner, path, id)?;
        let path = collection_key(path);

        let mut merged = match inner.collections.get(&path).and_then(|c| c.get(id)) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Fields::new(),
        };
        for (key, value) in fields {
            // null clears a field
            if value.is_null() {
                merged.remove(&key);
            } else {
                merged.insert(key, value);
            }
        }

        inner.put(&path, id, Value::Object(merged));
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        self.check_writes(&inner, path, id)?;
        inner.take(&collection_key(path), id);
        Ok(())
    }

    fn generate_id(&self, _path: &str) -> String {
        Uuid::now_v7().to_string()
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    async fn set_persistence(&self, persistence: AuthPersistence) -> SyncResult<()> {
        self.inner.lock().await.persistence = persistence;
        Ok(())
    }
}
