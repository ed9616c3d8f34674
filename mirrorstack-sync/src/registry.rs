//! Resource registry.
//!
//! Normalizes caller-supplied resource specs into [`ResourceDescriptor`]s and
//! serves the per-resource side tables (storage path, attachment fields) that
//! the synchronizers and the dispatcher read. Filled once at startup.

use crate::error::{SyncError, SyncResult};
use mirrorstack_model::{ResourceDescriptor, ResourceSpec};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Normalizes a spec: default path `"/" + name`, no attachment fields, not public.
pub fn normalize(spec: ResourceSpec) -> SyncResult<ResourceDescriptor> {
    let (name, path, attachment_fields, is_public) = match spec {
        ResourceSpec::Name(name) => (Some(name), None, None, None),
        ResourceSpec::Descriptor(d) => (d.name, d.path, d.attachment_fields, d.is_public),
    };

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| SyncError::InvalidResource("resource descriptor has no name".into()))?;

    let path = match path {
        Some(p) if !p.trim().is_empty() => p,
        _ => format!("/{name}"),
    };

    Ok(ResourceDescriptor {
        name,
        path,
        attachment_fields: attachment_fields.unwrap_or_default(),
        is_public: is_public.unwrap_or(false),
    })
}

/// The set of registered resources.
#[derive(Debug, Default)]
pub struct Registry {
    resources: HashMap<String, Arc<ResourceDescriptor>>,
    /// Names in registration order.
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource. Fails on a missing name or a name already taken.
    pub fn register(&mut self, spec: impl Into<ResourceSpec>) -> SyncResult<Arc<ResourceDescriptor>> {
        let descriptor = normalize(spec.into())?;
        if self.resources.contains_key(&descriptor.name) {
            return Err(SyncError::InvalidResource(format!(
                "resource {} registered twice",
                descriptor.name
            )));
        }

        info!(
            "Registered resource {} at {} (public={}, attachments={:?})",
            descriptor.name, descriptor.path, descriptor.is_public, descriptor.attachment_fields
        );

        let descriptor = Arc::new(descriptor);
        self.order.push(descriptor.name.clone());
        self.resources
            .insert(descriptor.name.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Looks up a registered resource.
    pub fn get(&self, name: &str) -> Option<&Arc<ResourceDescriptor>> {
        self.resources.get(name)
    }

    /// Looks up a registered resource, failing with `UnknownResource`.
    pub fn require(&self, name: &str) -> SyncResult<&Arc<ResourceDescriptor>> {
        self.get(name)
            .ok_or_else(|| SyncError::UnknownResource(name.to_string()))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered descriptors, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceDescriptor>> {
        self.order.iter().filter_map(|name| self.resources.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
