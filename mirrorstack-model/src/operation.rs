//! Generic CRUD operations and their parameters.
//!
//! Callers address the engine with an operation name, a resource name and a
//! JSON parameter object. [`Request::parse`] turns the name and object into a
//! typed request; names the engine does not know become
//! [`OperationKind::Unrecognized`] rather than an error.

use crate::{Error, Fields, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// The kind of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetList,
    GetOne,
    GetMany,
    GetManyReference,
    Create,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    /// Any name not listed above. Dispatching it yields an empty result.
    Unrecognized(String),
}

impl OperationKind {
    /// Parses an operation name. Accepts `GET_LIST` and `getList` spellings.
    pub fn parse(name: &str) -> Self {
        match name {
            "GET_LIST" | "getList" => Self::GetList,
            "GET_ONE" | "getOne" => Self::GetOne,
            "GET_MANY" | "getMany" => Self::GetMany,
            "GET_MANY_REFERENCE" | "getManyReference" => Self::GetManyReference,
            "CREATE" | "create" => Self::Create,
            "UPDATE" | "update" => Self::Update,
            "UPDATE_MANY" | "updateMany" => Self::UpdateMany,
            "DELETE" | "delete" => Self::Delete,
            "DELETE_MANY" | "deleteMany" => Self::DeleteMany,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Canonical name of the operation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::GetList => "GET_LIST",
            Self::GetOne => "GET_ONE",
            Self::GetMany => "GET_MANY",
            Self::GetManyReference => "GET_MANY_REFERENCE",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::UpdateMany => "UPDATE_MANY",
            Self::Delete => "DELETE",
            Self::DeleteMany => "DELETE_MANY",
            Self::Unrecognized(name) => name,
        }
    }

    /// Whether the operation writes to the remote store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Update | Self::UpdateMany | Self::Delete | Self::DeleteMany
        )
    }
}

impl FromStr for OperationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for OperationKind {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Parameters ──────────────────────────────────────────────────

fn id_from_value<E: serde::de::Error>(value: Value) -> std::result::Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected a string or numeric id, got {other}"))),
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    id_from_value(Value::deserialize(d)?)
}

fn deserialize_ids<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    Vec::<Value>::deserialize(d)?
        .into_iter()
        .map(id_from_value)
        .collect()
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// The index range this page covers within `len` items.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.page.max(1).saturating_sub(1).saturating_mul(self.per_page);
        let end = start.saturating_add(self.per_page);
        start.min(len)..end.min(len)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Parameters shared by the list-shaped operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListParams {
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub filter: Fields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetOneParams {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetManyParams {
    #[serde(deserialize_with = "deserialize_ids")]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetManyReferenceParams {
    pub target: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(flatten)]
    pub list: ListParams,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    pub data: Fields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub data: Fields,
    #[serde(default)]
    pub previous_data: Option<Fields>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateManyParams {
    #[serde(deserialize_with = "deserialize_ids")]
    pub ids: Vec<String>,
    #[serde(default)]
    pub data: Fields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub previous_data: Option<Fields>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteManyParams {
    #[serde(deserialize_with = "deserialize_ids")]
    pub ids: Vec<String>,
}

// ── Typed request ───────────────────────────────────────────────

/// An operation kind paired with its decoded parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetList(ListParams),
    GetOne(GetOneParams),
    GetMany(GetManyParams),
    GetManyReference(GetManyReferenceParams),
    Create(CreateParams),
    Update(UpdateParams),
    UpdateMany(UpdateManyParams),
    Delete(DeleteParams),
    DeleteMany(DeleteManyParams),
    Unrecognized(String),
}

impl Request {
    /// Decodes `params` for the given kind. `null` counts as an empty object.
    pub fn parse(kind: &OperationKind, params: Value) -> Result<Self> {
        fn decode<T: DeserializeOwned>(kind: &OperationKind, params: Value) -> Result<T> {
            let params = match params {
                Value::Null => Value::Object(Fields::new()),
                other => other,
            };
            serde_json::from_value(params).map_err(|e| Error::InvalidParams {
                operation: kind.to_string(),
                reason: e.to_string(),
            })
        }

        Ok(match kind {
            OperationKind::GetList => Self::GetList(decode(kind, params)?),
            OperationKind::GetOne => Self::GetOne(decode(kind, params)?),
            OperationKind::GetMany => Self::GetMany(decode(kind, params)?),
            OperationKind::GetManyReference => Self::GetManyReference(decode(kind, params)?),
            OperationKind::Create => Self::Create(decode(kind, params)?),
            OperationKind::Update => Self::Update(decode(kind, params)?),
            OperationKind::UpdateMany => Self::UpdateMany(decode(kind, params)?),
            OperationKind::Delete => Self::Delete(decode(kind, params)?),
            OperationKind::DeleteMany => Self::DeleteMany(decode(kind, params)?),
            OperationKind::Unrecognized(name) => Self::Unrecognized(name.clone()),
        })
    }

    /// The kind of this request.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GetList(_) => OperationKind::GetList,
            Self::GetOne(_) => OperationKind::GetOne,
            Self::GetMany(_) => OperationKind::GetMany,
            Self::GetManyReference(_) => OperationKind::GetManyReference,
            Self::Create(_) => OperationKind::Create,
            Self::Update(_) => OperationKind::Update,
            Self::UpdateMany(_) => OperationKind::UpdateMany,
            Self::Delete(_) => OperationKind::Delete,
            Self::DeleteMany(_) => OperationKind::DeleteMany,
            Self::Unrecognized(name) => OperationKind::Unrecognized(name.clone()),
        }
    }
}
