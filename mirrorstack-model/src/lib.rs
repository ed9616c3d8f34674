//! Core data model for mirrorstack.
//!
//! Defines the plain types that the sync engine and its callers exchange:
//! - [`Record`]: an identifier plus an arbitrary JSON object of fields
//! - [`ResourceSpec`] / [`ResourceDescriptor`]: what to mirror and where it lives
//! - [`ChangeEvent`]: one entry of a remote collection's live feed
//! - [`OperationKind`] / [`Request`]: the generic CRUD operations and their parameters
//! - [`AuthState`] / [`AuthPersistence`]: the remote store's session signal
//!
//! Nothing here performs I/O. The engine never looks inside a record beyond its
//! identifier and the two timestamp fields it stamps.

mod event;
mod operation;
mod record;
mod resource;

pub use event::{AuthPersistence, AuthState, ChangeEvent};
pub use operation::{
    CreateParams, DeleteManyParams, DeleteParams, GetManyParams, GetManyReferenceParams,
    GetOneParams, ListParams, OperationKind, Pagination, Request, Sort, SortOrder,
    UpdateManyParams, UpdateParams,
};
pub use record::{Fields, Record, ID_FIELD, VALUE_FIELD};
pub use resource::{DescriptorSpec, ResourceDescriptor, ResourceSpec};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building model values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameters for {operation}: {reason}")]
    InvalidParams { operation: String, reason: String },
}
