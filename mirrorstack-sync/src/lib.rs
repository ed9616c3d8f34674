//! Snapshot-then-live mirror of remote collections.
//!
//! Keeps an in-memory copy of one or more remotely hosted, key-ordered
//! collections and serves generic CRUD operations against it.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Registry**: normalizes resource specs into descriptors
//! - **Cache**: one key-ordered partition per resource, single writer each
//! - **Synchronizer**: per resource, loads the snapshot then applies the live feed
//! - **Transform**: post-read and pre-save hooks around the cache
//! - **Dispatcher**: waits for readiness and routes requests to handlers
//!
//! ## Resource lifecycle
//!
//! 1. **Snapshot**: read the whole collection in key order (after sign-in, if not public)
//! 2. **Attach**: subscribe to the live feed from the last snapshot key
//! 3. **Settle**: wait the configured grace window
//! 4. **Live**: readiness resolves and operations run
//!
//! Mutations never write to the cache. They go to the remote store, and the
//! cache reflects them once the live feed delivers the change.
//!
//! # Example
//!
//! ```
//! use mirrorstack_sync::{EngineConfig, MemoryStore, MirrorEngine, RemoteStore};
//! use mirrorstack_model::ResourceSpec;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! store.seed("/posts", "a1", json!({"title": "x"})).await;
//!
//! let mut config = EngineConfig::new([ResourceSpec::descriptor("posts").public()]);
//! config.initial_readiness_settle_delay_ms = 0;
//!
//! let engine = MirrorEngine::builder(store as Arc<dyn RemoteStore>)
//!     .with_config(config)
//!     .start()
//!     .await?;
//!
//! let result = engine.execute("GET_ONE", "posts", json!({"id": "a1"})).await?;
//! assert_eq!(result.to_json(), json!({"data": {"id": "a1", "title": "x"}}));
//! # Ok::<(), mirrorstack_sync::SyncError>(())
//! # }).unwrap();
//! ```

pub mod attachments;
pub mod cache;
mod config;
mod dispatcher;
mod engine;
mod error;
pub mod query;
pub mod readiness;
pub mod registry;
pub mod remote;
mod synchronizer;
pub mod transform;

pub use attachments::{AttachmentStore, MemoryAttachmentStore, NoAttachments};
pub use cache::{CacheStore, PartitionWriter};
pub use config::{EngineConfig, TimestampFieldNames, DEFAULT_SETTLE_DELAY_MS};
pub use dispatcher::{Dispatcher, OperationResult};
pub use engine::{EngineBuilder, MirrorEngine};
pub use error::{SyncError, SyncResult};
pub use readiness::{ReadinessToken, StatusHandle, SyncStatus};
pub use registry::Registry;
pub use remote::{ChangeFeed, MemoryStore, RemoteStore};
pub use synchronizer::Synchronizer;
pub use transform::{FnTransform, IdentityTransform, RecordTransform};
