//! Binary attachment transport.
//!
//! Resources may name attachment fields. On every Create/Update the
//! dispatcher hands each such field to an [`AttachmentStore`] before the
//! record is saved; the returned reference replaces the field value.

pub mod memory;

pub use memory::MemoryAttachmentStore;

use crate::error::SyncResult;
use async_trait::async_trait;
use mirrorstack_model::Fields;
use serde_json::Value;

/// Upload and deletion of record attachments.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Uploads the payload of one attachment field.
    ///
    /// `payload` is the full outgoing record data and `record_path` the remote
    /// path of the record. Returns `None` if the payload carries nothing to
    /// upload for `field`, leaving the field untouched.
    async fn upload(
        &self,
        field: &str,
        payload: &Fields,
        resource: &str,
        record_path: &str,
    ) -> SyncResult<Option<Value>>;

    /// Deletes the attachment stored at `path`.
    async fn delete(&self, path: &str) -> SyncResult<()>;
}

/// Attachment store used when none is configured: uploads nothing, deletes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttachments;

#[async_trait]
impl AttachmentStore for NoAttachments {
    async fn upload(&self, _: &str, _: &Fields, _: &str, _: &str) -> SyncResult<Option<Value>> {
        Ok(None)
    }

    async fn delete(&self, _: &str) -> SyncResult<()> {
        Ok(())
    }
}
