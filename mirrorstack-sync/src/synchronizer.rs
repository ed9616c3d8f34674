//! Per-resource mirror task.
//!
//! A [`Synchronizer`] owns its resource's [`PartitionWriter`]. It reads the
//! collection once in key order, attaches the live feed at the last key it
//! saw, and then applies change events until the feed ends. Readiness is
//! published once the settle delay after attachment has elapsed.

use crate::cache::PartitionWriter;
use crate::error::{SyncError, SyncResult};
use crate::readiness::{StatusHandle, SyncStatus};
use crate::remote::{ChangeFeed, RemoteStore};
use crate::transform::RecordTransform;
use mirrorstack_model::{AuthState, ChangeEvent, Record, ResourceDescriptor};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct Synchronizer {
    descriptor: Arc<ResourceDescriptor>,
    remote: Arc<dyn RemoteStore>,
    transform: Arc<dyn RecordTransform>,
    writer: PartitionWriter,
    status: StatusHandle,
    settle_delay: Duration,
}

impl Synchronizer {
    pub fn new(
        descriptor: Arc<ResourceDescriptor>,
        remote: Arc<dyn RemoteStore>,
        transform: Arc<dyn RecordTransform>,
        writer: PartitionWriter,
        status: StatusHandle,
        settle_delay: Duration,
    ) -> Self {
        Self {
            descriptor,
            remote,
            transform,
            writer,
            status,
            settle_delay,
        }
    }

    /// Runs the mirror until the live feed ends.
    pub async fn run(self) {
        let name = self.descriptor.name.clone();

        let mut feed = match self.load().await {
            Ok(feed) => feed,
            Err(e) => {
                error!("Failed to mirror {}: {}", name, e);
                self.status.set(SyncStatus::Failed(e.to_string()));
                return;
            }
        };

        self.status.set(SyncStatus::Settling);
        let settle = tokio::time::sleep(self.settle_delay);
        tokio::pin!(settle);
        let mut settled = false;

        loop {
            tokio::select! {
                () = &mut settle, if !settled => {
                    settled = true;
                    self.status.set(SyncStatus::Live);
                    info!("Resource {} is live", name);
                }
                event = feed.recv() => match event {
                    Some(event) => self.apply(event).await,
                    None => {
                        warn!("Live feed for {} closed", name);
                        if !settled {
                            (&mut settle).await;
                            self.status.set(SyncStatus::Live);
                        }
                        break;
                    }
                },
            }
        }
    }

    /// Snapshot phase: waits for a session if needed, reads the collection
    /// and attaches the feed.
    async fn load(&self) -> SyncResult<ChangeFeed> {
        let name = &self.descriptor.name;
        let path = &self.descriptor.path;
        self.status.set(SyncStatus::SnapshotLoading);

        if !self.descriptor.is_public {
            debug!("Resource {} waiting for an authenticated session", name);
            let mut auth = self.remote.auth_state();
            auth.wait_for(AuthState::is_authenticated)
                .await
                .map_err(|_| SyncError::ChannelClosed)?;
        }

        let snapshot = self.remote.read_ordered(path).await?;
        let count = snapshot.len();
        // Feed attaches at the last snapshot key; that entry is announced again.
        let last_key = snapshot.last().map(|(key, _)| key.clone());

        self.writer
            .extend(snapshot.into_iter().map(|(key, raw)| {
                debug!("Snapshot entry {}/{}", name, key);
                self.to_record(key, raw)
            }))
            .await;
        info!("Loaded {} records for {} from {}", count, name, path);

        self.remote.subscribe(path, last_key.as_deref()).await
    }

    async fn apply(&self, event: ChangeEvent) {
        let kind = event.kind();
        match event {
            ChangeEvent::Added { key, value } | ChangeEvent::Changed { key, value } => {
                let record = self.to_record(key, value);
                debug!("Applied {} {}/{}", kind, self.writer.resource(), record.id);
                self.writer.upsert(record).await;
            }
            ChangeEvent::Removed { key } => {
                if self.writer.remove(&key).await.is_some() {
                    debug!("Applied removed {}/{}", self.writer.resource(), key);
                }
            }
        }
    }

    /// Runs the post-read hook. The cached record stays under its remote key
    /// whatever id the hook returns.
    fn to_record(&self, key: String, raw: Value) -> Record {
        let mut record = self.transform.post_read(raw, &key, &self.descriptor.name);
        record.id = key;
        record
    }
}
