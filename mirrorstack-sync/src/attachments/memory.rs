//! In-process [`AttachmentStore`] for tests and local use.

use super::AttachmentStore;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use mirrorstack_model::Fields;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Member of an attachment field value that holds the bytes to upload.
pub const RAW_FILE_FIELD: &str = "rawFile";

/// In-memory attachment store.
///
/// A field is uploaded when its value is an object with a `rawFile` member.
/// The stored reference is `{"src": "memory://<path>", "title": ...}`.
#[derive(Debug, Default)]
pub struct MemoryAttachmentStore {
    objects: Mutex<BTreeMap<String, Value>>,
    deleted: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Uploaded objects by path.
    pub async fn stored(&self) -> BTreeMap<String, Value> {
        self.objects.lock().await.clone()
    }

    /// Paths passed to `delete`, in call order.
    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn upload(
        &self,
        field: &str,
        payload: &Fields,
        resource: &str,
        record_path: &str,
    ) -> SyncResult<Option<Value>> {
        let Some(Value::Object(file)) = payload.get(field) else {
            return Ok(None);
        };
        let Some(raw) = file.get(RAW_FILE_FIELD) else {
            return Ok(None);
        };
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(SyncError::Upstream(format!(
                "upload of {resource}.{field} rejected"
            )));
        }

        let path = format!("{}/{}", record_path.trim_end_matches('/'), field);
        let title = file.get("title").cloned().unwrap_or_else(|| json!(field));
        self.objects.lock().await.insert(path.clone(), raw.clone());
        debug!("Uploaded attachment {}", path);

        Ok(Some(json!({
            "src": format!("memory://{path}"),
            "title": title,
        })))
    }

    async fn delete(&self, path: &str) -> SyncResult<()> {
        self.objects.lock().await.remove(path);
        self.deleted.lock().await.push(path.to_string());
        Ok(())
    }
}
