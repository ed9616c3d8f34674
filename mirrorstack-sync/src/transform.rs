//! Record hooks run on the way into the cache and on the way out to the
//! remote store.

use mirrorstack_model::Record;
use serde_json::Value;

/// Hooks applied to records crossing the engine boundary.
///
/// `post_read` runs on every record entering the cache: once per snapshot
/// entry and once per added/changed event. `pre_save` runs on every record
/// just before a create/update is written to the remote store.
///
/// Implementations may do any computation they like but must not reach back
/// into the engine's cache.
pub trait RecordTransform: Send + Sync {
    /// Turns a raw remote value into a cached record. The record is cached
    /// under the remote key `id`; any other id it carries is replaced.
    fn post_read(&self, raw: Value, id: &str, resource: &str) -> Record {
        let _ = resource;
        Record::from_raw(id, raw)
    }

    /// Prepares an outgoing record.
    fn pre_save(&self, record: Record, resource: &str) -> Record {
        let _ = resource;
        record
    }
}

/// The default hooks: merge the id in on read, pass through on save.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl RecordTransform for IdentityTransform {}

type PostReadFn = dyn Fn(Value, &str, &str) -> Record + Send + Sync;
type PreSaveFn = dyn Fn(Record, &str) -> Record + Send + Sync;

/// Builds a [`RecordTransform`] from closures. Unset hooks keep the defaults.
#[derive(Default)]
pub struct FnTransform {
    post_read: Option<Box<PostReadFn>>,
    pre_save: Option<Box<PreSaveFn>>,
}

impl FnTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post_read<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &str, &str) -> Record + Send + Sync + 'static,
    {
        self.post_read = Some(Box::new(f));
        self
    }

    pub fn with_pre_save<F>(mut self, f: F) -> Self
    where
        F: Fn(Record, &str) -> Record + Send + Sync + 'static,
    {
        self.pre_save = Some(Box::new(f));
        self
    }
}

impl RecordTransform for FnTransform {
    fn post_read(&self, raw: Value, id: &str, resource: &str) -> Record {
        match &self.post_read {
            Some(f) => f(raw, id, resource),
            None => Record::from_raw(id, raw),
        }
    }

    fn pre_save(&self, record: Record, resource: &str) -> Record {
        match &self.pre_save {
            Some(f) => f(record, resource),
            None => record,
        }
    }
}

impl std::fmt::Debug for FnTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransform")
            .field("post_read", &self.post_read.is_some())
            .field("pre_save", &self.pre_save.is_some())
            .finish()
    }
}
