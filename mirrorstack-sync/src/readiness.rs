//! Per-resource readiness tokens.
//!
//! Each resource's synchronizer publishes its [`SyncStatus`] on a watch
//! channel. A [`ReadinessToken`] is the receiving end: dispatcher operations
//! call [`ReadinessToken::wait`] before touching the resource's cache.

use crate::error::{SyncError, SyncResult};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of one resource's mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Registered, synchronizer not started yet.
    Uninitialized,
    /// Reading the initial snapshot (or waiting for a session, if not public).
    SnapshotLoading,
    /// Snapshot applied and live feed attached; inside the settle window.
    Settling,
    /// Ready: operations may run.
    Live,
    /// The snapshot read or the feed attachment failed.
    Failed(String),
}

impl SyncStatus {
    /// Whether operations may run against the cache.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Whether waiting any longer is pointless.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Live | Self::Failed(_))
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::SnapshotLoading => f.write_str("snapshot-loading"),
            Self::Settling => f.write_str("settling"),
            Self::Live => f.write_str("live"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Creates the status channel for one resource.
pub fn channel(resource: &str) -> (StatusHandle, ReadinessToken) {
    let (tx, rx) = watch::channel(SyncStatus::Uninitialized);
    (
        StatusHandle { tx: Arc::new(tx) },
        ReadinessToken {
            resource: resource.to_string(),
            rx,
        },
    )
}

/// Publishing side of a resource's status.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    tx: Arc<watch::Sender<SyncStatus>>,
}

impl StatusHandle {
    /// Publishes a new status, even when nobody is waiting.
    pub fn set(&self, status: SyncStatus) {
        self.tx.send_replace(status);
    }
}

/// Receiving side of a resource's status.
#[derive(Debug, Clone)]
pub struct ReadinessToken {
    resource: String,
    rx: watch::Receiver<SyncStatus>,
}

impl ReadinessToken {
    /// The resource this token gates.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The current status.
    pub fn status(&self) -> SyncStatus {
        self.rx.borrow().clone()
    }

    /// Whether the resource is ready right now.
    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_ready()
    }

    /// Waits until the resource is live.
    ///
    /// Never times out. Fails with `Upstream` if the mirror failed to load and
    /// with `ChannelClosed` if the engine shut down first.
    pub async fn wait(&self) -> SyncResult<()> {
        let mut rx = self.rx.clone();
        let status = rx
            .wait_for(SyncStatus::is_settled)
            .await
            .map_err(|_| SyncError::ChannelClosed)?;
        match &*status {
            SyncStatus::Failed(reason) => Err(SyncError::Upstream(reason.clone())),
            _ => Ok(()),
        }
    }
}
