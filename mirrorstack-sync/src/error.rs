//! Error types for the sync engine.

use thiserror::Error;

/// Result type for engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while registering, synchronizing or dispatching.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A resource descriptor could not be registered.
    #[error("invalid resource: {0}")]
    InvalidResource(String),

    /// An operation named a resource that was never registered.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// A record is not in the resource's cache.
    #[error("record {id} not found in {resource}")]
    NotFound { resource: String, id: String },

    /// The remote store or the attachment transport failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Operation parameters could not be decoded.
    #[error(transparent)]
    InvalidParams(#[from] mirrorstack_model::Error),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// The engine shut down while an operation was waiting on it.
    #[error("channel closed")]
    ChannelClosed,
}

impl SyncError {
    /// Creates an upstream failure from any displayable error.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }

    /// Creates a not-found error.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}
