//! Routes typed requests to resource-aware handlers.
//!
//! Every request first waits on its resource's readiness token. Reads are
//! served from the cache. Mutations go to the remote store only; the cache
//! catches up when the live feed delivers the change.

use crate::attachments::AttachmentStore;
use crate::cache::CacheStore;
use crate::config::TimestampFieldNames;
use crate::error::{SyncError, SyncResult};
use crate::query;
use crate::readiness::ReadinessToken;
use crate::registry::Registry;
use crate::remote::RemoteStore;
use crate::transform::RecordTransform;
use chrono::{SecondsFormat, Utc};
use mirrorstack_model::{
    CreateParams, DeleteParams, Fields, GetManyParams, GetManyReferenceParams, ListParams,
    OperationKind, Record, Request, ResourceDescriptor, UpdateParams, ID_FIELD,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The outcome of a dispatched operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// A page of records and the number of records that matched.
    List { data: Vec<Record>, total: usize },
    /// A single record: read, created or updated.
    One(Record),
    /// The id of a deleted record.
    Deleted(String),
    /// The ids touched by a bulk mutation.
    Ids(Vec<String>),
    /// Result of an unrecognized operation.
    Empty,
}

impl OperationResult {
    /// The single record, if this result carries one.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::One(record) => Some(record),
            _ => None,
        }
    }

    /// The records of a list result; empty for any other result.
    pub fn records(&self) -> &[Record] {
        match self {
            Self::List { data, .. } => data,
            _ => &[],
        }
    }

    /// JSON form returned to callers.
    pub fn to_json(&self) -> Value {
        match self {
            Self::List { data, total } => json!({
                "data": data.iter().map(Record::to_value).collect::<Vec<_>>(),
                "total": total,
            }),
            Self::One(record) => json!({ "data": record.to_value() }),
            Self::Deleted(id) => json!({ "data": { "id": id } }),
            Self::Ids(ids) => json!({ "data": ids }),
            Self::Empty => json!({ "data": [] }),
        }
    }
}

pub struct Dispatcher {
    registry: Registry,
    cache: Arc<CacheStore>,
    tokens: HashMap<String, ReadinessToken>,
    remote: Arc<dyn RemoteStore>,
    attachments: Arc<dyn AttachmentStore>,
    transform: Arc<dyn RecordTransform>,
    timestamps: Option<TimestampFieldNames>,
}

impl Dispatcher {
    pub(crate) fn new(
        registry: Registry,
        cache: Arc<CacheStore>,
        tokens: HashMap<String, ReadinessToken>,
        remote: Arc<dyn RemoteStore>,
        attachments: Arc<dyn AttachmentStore>,
        transform: Arc<dyn RecordTransform>,
        timestamps: Option<TimestampFieldNames>,
    ) -> Self {
        Self {
            registry,
            cache,
            tokens,
            remote,
            attachments,
            transform,
            timestamps,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn readiness(&self, resource: &str) -> Option<&ReadinessToken> {
        self.tokens.get(resource)
    }

    /// Decodes and runs one operation.
    pub async fn execute(
        &self,
        kind: impl Into<OperationKind>,
        resource: &str,
        params: Value,
    ) -> SyncResult<OperationResult> {
        let kind = kind.into();
        self.registry.require(resource)?;
        let request = Request::parse(&kind, params)?;
        self.dispatch(resource, request).await
    }

    /// Runs an already decoded request once the resource is ready.
    pub async fn dispatch(&self, resource: &str, request: Request) -> SyncResult<OperationResult> {
        let descriptor = Arc::clone(self.registry.require(resource)?);
        let token = self
            .tokens
            .get(resource)
            .ok_or_else(|| SyncError::UnknownResource(resource.to_string()))?;
        token.wait().await?;

        let kind = request.kind();
        if kind.is_mutation() {
            debug!("Dispatching {} on {} to the remote store", kind, token.resource());
        } else {
            debug!("Dispatching {} on {} from the cache", kind, token.resource());
        }
        match request {
            Request::GetList(params) => self.get_list(&descriptor, params).await,
            Request::GetOne(params) => match self.cache.get(resource, &params.id).await {
                Some(record) => Ok(OperationResult::One(record)),
                None => Err(SyncError::not_found(resource, params.id)),
            },
            Request::GetMany(params) => self.get_many(&descriptor, params).await,
            Request::GetManyReference(params) => {
                self.get_many_reference(&descriptor, params).await
            }
            Request::Create(params) => self.create(&descriptor, params).await,
            Request::Update(params) => self.update(&descriptor, params).await,
            Request::UpdateMany(params) => {
                for id in &params.ids {
                    let update = UpdateParams {
                        id: id.clone(),
                        data: params.data.clone(),
                        previous_data: None,
                    };
                    self.update(&descriptor, update).await?;
                }
                Ok(OperationResult::Ids(params.ids))
            }
            Request::Delete(params) => self.delete(&descriptor, params).await,
            Request::DeleteMany(params) => {
                for id in &params.ids {
                    let delete = DeleteParams {
                        id: id.clone(),
                        previous_data: None,
                    };
                    self.delete(&descriptor, delete).await?;
                }
                Ok(OperationResult::Ids(params.ids))
            }
            Request::Unrecognized(name) => {
                warn!("Unrecognized operation {} on {}, returning no data", name, resource);
                Ok(OperationResult::Empty)
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    async fn get_list(
        &self,
        descriptor: &ResourceDescriptor,
        params: ListParams,
    ) -> SyncResult<OperationResult> {
        let records = self
            .cache
            .records(&descriptor.name)
            .await
            .unwrap_or_default();
        let (data, total) = query::list(records, &params);
        Ok(OperationResult::List { data, total })
    }

    async fn get_many(
        &self,
        descriptor: &ResourceDescriptor,
        params: GetManyParams,
    ) -> SyncResult<OperationResult> {
        let mut data = Vec::with_capacity(params.ids.len());
        for id in &params.ids {
            if let Some(record) = self.cache.get(&descriptor.name, id).await {
                data.push(record);
            }
        }
        let total = data.len();
        Ok(OperationResult::List { data, total })
    }

    async fn get_many_reference(
        &self,
        descriptor: &ResourceDescriptor,
        params: GetManyReferenceParams,
    ) -> SyncResult<OperationResult> {
        let mut list = params.list;
        list.filter.insert(params.target, Value::String(params.id));
        self.get_list(descriptor, list).await
    }

    // ── Writes ───────────────────────────────────────────────────

    async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        params: CreateParams,
    ) -> SyncResult<OperationResult> {
        let mut data = params.data;
        let id = match data.remove(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => self.remote.generate_id(&descriptor.path),
        };
        let record = self.save(descriptor, id, data, None, true).await?;
        Ok(OperationResult::One(record))
    }

    async fn update(
        &self,
        descriptor: &ResourceDescriptor,
        params: UpdateParams,
    ) -> SyncResult<OperationResult> {
        let previous = match self.cache.get(&descriptor.name, &params.id).await {
            Some(record) => Some(record),
            None => params
                .previous_data
                .map(|fields| Record::new(params.id.clone(), fields)),
        };
        let record = self
            .save(descriptor, params.id, params.data, previous, false)
            .await?;
        Ok(OperationResult::One(record))
    }

    /// Uploads attachments, applies the pre-save hook, stamps timestamps and
    /// writes. Returns the record as it reads after the write.
    async fn save(
        &self,
        descriptor: &ResourceDescriptor,
        id: String,
        mut data: Fields,
        previous: Option<Record>,
        creating: bool,
    ) -> SyncResult<Record> {
        data.remove(ID_FIELD);
        let record_path = descriptor.record_path(&id);

        // Every upload resolves before anything is written.
        let mut references = Vec::new();
        for field in &descriptor.attachment_fields {
            if let Some(reference) = self
                .attachments
                .upload(field, &data, &descriptor.name, &record_path)
                .await?
            {
                references.push((field.clone(), reference));
            }
        }
        data.extend(references);

        let mut record = self
            .transform
            .pre_save(Record::new(id, data), &descriptor.name);
        if let Some(names) = &self.timestamps {
            let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            if creating {
                record.set(names.created.clone(), now.clone());
            }
            record.set(names.updated.clone(), now);
        }

        self.remote
            .write(&descriptor.path, &record.id, record.fields.clone())
            .await?;
        info!(
            "{} {}/{}",
            if creating { "Created" } else { "Updated" },
            descriptor.name,
            record.id
        );

        let mut fields = previous.map(|p| p.fields).unwrap_or_default();
        for (key, value) in record.fields {
            if value.is_null() {
                fields.remove(&key);
            } else {
                fields.insert(key, value);
            }
        }
        Ok(Record::new(record.id, fields))
    }

    async fn delete(
        &self,
        descriptor: &ResourceDescriptor,
        params: DeleteParams,
    ) -> SyncResult<OperationResult> {
        self.remote.delete(&descriptor.path, &params.id).await?;
        for field in &descriptor.attachment_fields {
            self.attachments
                .delete(&descriptor.attachment_path(&params.id, field))
                .await?;
        }
        info!("Deleted {}/{}", descriptor.name, params.id);
        Ok(OperationResult::Deleted(params.id))
    }
}
