//! Live-feed events and the remote session signal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One incremental change delivered by a remote collection's live feed.
///
/// Values are raw remote JSON; the engine turns them into records through
/// its post-read transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeEvent {
    /// A child appeared (or was re-announced when the feed attached).
    Added { key: String, value: Value },
    /// An existing child's value changed.
    Changed { key: String, value: Value },
    /// A child was removed.
    Removed { key: String },
}

impl ChangeEvent {
    /// The key of the child this event concerns.
    pub fn key(&self) -> &str {
        match self {
            Self::Added { key, .. } | Self::Changed { key, .. } | Self::Removed { key } => key,
        }
    }

    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Changed { .. } => "changed",
            Self::Removed { .. } => "removed",
        }
    }
}

/// Authentication state reported by the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AuthState {
    #[default]
    None,
    Authenticated {
        uid: String,
    },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// How long the remote store keeps an authenticated session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPersistence {
    /// Survives restarts.
    #[default]
    Local,
    /// Lives as long as the current session.
    Session,
    /// Kept in memory only.
    None,
}
