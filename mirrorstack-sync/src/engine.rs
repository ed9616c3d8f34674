//! Engine lifecycle: startup, dispatch entry point, shutdown.

use crate::attachments::{AttachmentStore, NoAttachments};
use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::dispatcher::{Dispatcher, OperationResult};
use crate::error::{SyncError, SyncResult};
use crate::readiness::{self, ReadinessToken, SyncStatus};
use crate::registry::Registry;
use crate::remote::RemoteStore;
use crate::synchronizer::Synchronizer;
use crate::transform::{IdentityTransform, RecordTransform};
use mirrorstack_model::{OperationKind, Request, ResourceDescriptor};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Configures and starts a [`MirrorEngine`].
pub struct EngineBuilder {
    remote: Arc<dyn RemoteStore>,
    config: EngineConfig,
    attachments: Arc<dyn AttachmentStore>,
    transform: Arc<dyn RecordTransform>,
}

impl EngineBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_attachments(mut self, attachments: Arc<dyn AttachmentStore>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_transform(mut self, transform: Arc<dyn RecordTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Registers every tracked resource and spawns one synchronizer per resource.
    ///
    /// Registration errors are returned before any synchronization starts.
    /// Must be called within a tokio runtime.
    pub async fn start(self) -> SyncResult<MirrorEngine> {
        let Self {
            remote,
            config,
            attachments,
            transform,
        } = self;

        let mut registry = Registry::new();
        for spec in &config.tracked_resources {
            registry.register(spec.clone())?;
        }

        remote.set_persistence(config.auth_persistence).await?;

        let mut cache = CacheStore::new();
        let mut tokens = HashMap::with_capacity(registry.len());
        let mut synchronizers = Vec::with_capacity(registry.len());
        for descriptor in registry.iter() {
            let writer = cache.allocate(&descriptor.name).ok_or_else(|| {
                SyncError::InvalidResource(format!("resource {} registered twice", descriptor.name))
            })?;
            let (status, token) = readiness::channel(&descriptor.name);
            tokens.insert(descriptor.name.clone(), token);
            synchronizers.push(Synchronizer::new(
                Arc::clone(descriptor),
                Arc::clone(&remote),
                Arc::clone(&transform),
                writer,
                status,
                config.settle_delay(),
            ));
        }

        let tasks = synchronizers
            .into_iter()
            .map(|sync| tokio::spawn(sync.run()))
            .collect();

        info!(
            "Mirror engine started: [{}] on {} store",
            registry.names().collect::<Vec<_>>().join(", "),
            remote.provider_name()
        );

        let timestamps = config
            .stamp_timestamps
            .then(|| config.timestamp_field_names.clone());
        let dispatcher = Dispatcher::new(
            registry,
            Arc::new(cache),
            tokens,
            remote,
            attachments,
            transform,
            timestamps,
        );

        Ok(MirrorEngine {
            dispatcher,
            tasks,
            closed: AtomicBool::new(false),
        })
    }
}

/// A running mirror of the tracked resources.
///
/// Dropping the engine stops every synchronizer.
pub struct MirrorEngine {
    dispatcher: Dispatcher,
    tasks: Vec<JoinHandle<()>>,
    closed: AtomicBool,
}

impl MirrorEngine {
    /// Starts configuring an engine on top of a remote store.
    pub fn builder(remote: Arc<dyn RemoteStore>) -> EngineBuilder {
        EngineBuilder {
            remote,
            config: EngineConfig::default(),
            attachments: Arc::new(NoAttachments),
            transform: Arc::new(IdentityTransform),
        }
    }

    /// Runs one operation, waiting for the resource to be ready first.
    ///
    /// Unknown resources fail immediately. Unrecognized operation kinds
    /// succeed with an empty result.
    pub async fn execute(
        &self,
        kind: impl Into<OperationKind>,
        resource: &str,
        params: Value,
    ) -> SyncResult<OperationResult> {
        self.ensure_open()?;
        self.dispatcher.execute(kind, resource, params).await
    }

    /// Runs an already decoded request.
    pub async fn dispatch(&self, resource: &str, request: Request) -> SyncResult<OperationResult> {
        self.ensure_open()?;
        self.dispatcher.dispatch(resource, request).await
    }

    /// Current status of a resource's mirror.
    pub fn status(&self, resource: &str) -> Option<SyncStatus> {
        self.dispatcher.readiness(resource).map(ReadinessToken::status)
    }

    /// A readiness token for a resource, for callers that want to wait themselves.
    pub fn readiness(&self, resource: &str) -> Option<ReadinessToken> {
        self.dispatcher.readiness(resource).cloned()
    }

    /// Registered resources in registration order.
    pub fn resources(&self) -> Vec<Arc<ResourceDescriptor>> {
        self.dispatcher.registry().iter().cloned().collect()
    }

    /// Stops every synchronizer. Later operations fail with `ChannelClosed`,
    /// as do operations still waiting for readiness.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for task in &self.tasks {
            task.abort();
        }
        info!("Mirror engine shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> SyncResult<()> {
        if self.is_shut_down() {
            return Err(SyncError::ChannelClosed);
        }
        Ok(())
    }
}

impl Drop for MirrorEngine {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
