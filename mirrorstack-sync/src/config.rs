//! Engine configuration.

use crate::error::SyncResult;
use mirrorstack_model::{AuthPersistence, ResourceSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default grace window between live-feed attachment and readiness.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1_000;

/// Names of the two timestamp fields the engine stamps on writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFieldNames {
    pub created: String,
    pub updated: String,
}

impl Default for TimestampFieldNames {
    fn default() -> Self {
        Self {
            created: "createdAt".to_string(),
            updated: "updatedAt".to_string(),
        }
    }
}

/// Configuration for the engine.
///
/// The post-read and pre-save hooks are not part of this struct; they are
/// passed to [`crate::EngineBuilder::with_transform`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Resources to mirror, as bare names or descriptor objects.
    pub tracked_resources: Vec<ResourceSpec>,
    /// Wait after the live feed attaches before a resource is ready (ms).
    pub initial_readiness_settle_delay_ms: u64,
    /// Field names used for creation and update timestamps.
    pub timestamp_field_names: TimestampFieldNames,
    /// Whether Create/Update stamp the timestamp fields.
    pub stamp_timestamps: bool,
    /// Session persistence pushed to the remote store at startup.
    pub auth_persistence: AuthPersistence,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracked_resources: Vec::new(),
            initial_readiness_settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            timestamp_field_names: TimestampFieldNames::default(),
            stamp_timestamps: true,
            auth_persistence: AuthPersistence::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration tracking the given resources.
    pub fn new<I, R>(resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceSpec>,
    {
        Self {
            tracked_resources: resources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.initial_readiness_settle_delay_ms)
    }
}
