//! Remote store abstraction.
//!
//! The engine talks to the backend that hosts the mirrored collections only
//! through [`RemoteStore`]. Transport, authentication and record encoding are
//! the implementation's business.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::SyncResult;
use async_trait::async_trait;
use mirrorstack_model::{AuthPersistence, AuthState, ChangeEvent, Fields};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

/// A live feed of change events for one collection, in delivery order.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl ChangeFeed {
    /// Creates a feed and the sender a store pushes events into.
    pub fn channel() -> (mpsc::UnboundedSender<ChangeEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Receives the next event. Returns `None` once the store ends the feed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }
}

/// Abstract remote store interface.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the name of the backend.
    fn provider_name(&self) -> &'static str;

    /// Reads every child of a collection, ascending by key.
    async fn read_ordered(&self, path: &str) -> SyncResult<Vec<(String, Value)>>;

    /// Attaches to a collection's live feed.
    ///
    /// Existing children with keys at or after `start_at` are first announced
    /// as `Added`; every later mutation of the collection follows in commit order.
    async fn subscribe(&self, path: &str, start_at: Option<&str>) -> SyncResult<ChangeFeed>;

    /// Merges top-level fields into a child, creating it if absent.
    async fn write(&self, path: &str, id: &str, fields: Fields) -> SyncResult<()>;

    /// Removes a child.
    async fn delete(&self, path: &str, id: &str) -> SyncResult<()>;

    /// Generates a fresh, time-ordered key for a new child of `path`.
    fn generate_id(&self, path: &str) -> String;

    /// Watches the authentication state.
    fn auth_state(&self) -> watch::Receiver<AuthState>;

    /// Sets how long an authenticated session persists.
    async fn set_persistence(&self, persistence: AuthPersistence) -> SyncResult<()>;
}
