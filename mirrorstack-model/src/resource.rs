//! Resource descriptors.
//!
//! Callers name the collections to mirror either with a bare string or with a
//! descriptor object. The engine normalizes both into a [`ResourceDescriptor`]
//! once at startup.

use serde::{Deserialize, Serialize};

/// Caller-supplied description of a resource, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceSpec {
    /// Just the resource name; everything else takes its default.
    Name(String),
    /// A descriptor object with optional overrides.
    Descriptor(DescriptorSpec),
}

impl ResourceSpec {
    /// Starts a descriptor for the named resource.
    pub fn descriptor(name: impl Into<String>) -> DescriptorSpec {
        DescriptorSpec {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Returns the name, if one was given.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Descriptor(spec) => spec.name.as_deref(),
        }
    }
}

impl From<&str> for ResourceSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ResourceSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<DescriptorSpec> for ResourceSpec {
    fn from(spec: DescriptorSpec) -> Self {
        Self::Descriptor(spec)
    }
}

/// The object form of a [`ResourceSpec`]. Every member is optional on the wire;
/// a missing name is rejected at registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorSpec {
    pub name: Option<String>,
    pub path: Option<String>,
    pub attachment_fields: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

impl DescriptorSpec {
    /// Overrides the storage path (defaults to `"/" + name`).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Declares the fields whose values are uploaded as attachments.
    pub fn with_attachments<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachment_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Marks the resource as readable without an authenticated session.
    pub fn public(mut self) -> Self {
        self.is_public = Some(true);
        self
    }
}

/// A normalized resource. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub name: String,
    pub path: String,
    pub attachment_fields: Vec<String>,
    pub is_public: bool,
}

impl ResourceDescriptor {
    /// Remote path of a single record.
    pub fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), id)
    }

    /// Storage path of one attachment field of a record.
    pub fn attachment_path(&self, id: &str, field: &str) -> String {
        format!("{}/{}", self.record_path(id), field)
    }
}
