//! # Artifact Registry
//!
//! Maps names and types to role descriptors.
//!
//! The registry is built once at startup: [`ArtifactRegistry::register`] every handler,
//! then [`ArtifactRegistry::scan`] the classes the application knows about. After that
//! it is shared read-only (usually behind an `Arc`) and only answers queries. It never
//! instantiates anything.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::framework::{ArtifactClass, RegistryError, RoleType};
use crate::registry::handler::{logical_name, ArtifactHandler, RoleDescriptor};

#[derive(Default)]
pub struct ArtifactRegistry {
    handlers: Vec<Arc<dyn ArtifactHandler>>,
    by_name: HashMap<(String, RoleType), Arc<RoleDescriptor>>,
    by_full_name: HashMap<String, Arc<RoleDescriptor>>,
    by_type: HashMap<TypeId, Arc<RoleDescriptor>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`ConventionHandler`](crate::registry::ConventionHandler) for every role.
    pub fn with_conventions() -> Self {
        let mut registry = Self::new();
        for handler in crate::registry::ConventionHandler::all() {
            // The role set is closed and each appears once in `RoleType::ALL`.
            let _ = registry.register(handler);
        }
        registry
    }

    /// Adds a classifier. Fails if its role type already has one.
    pub fn register(&mut self, handler: Arc<dyn ArtifactHandler>) -> Result<(), RegistryError> {
        let role = handler.role_type();
        if self.handler(role).is_some() {
            warn!(%role, "Duplicate role registration");
            return Err(RegistryError::DuplicateRole(role));
        }
        debug!(%role, suffix = handler.suffix(), "Handler registered");
        self.handlers.push(handler);
        Ok(())
    }

    /// Classifies `classes` and indexes every match.
    ///
    /// Classes seen by an earlier scan are skipped, so re-scanning a superset only adds
    /// the new ones. Returns the number of newly classified classes.
    pub fn scan<'a>(&mut self, classes: impl IntoIterator<Item = &'a ArtifactClass>) -> usize {
        let mut fresh: HashMap<RoleType, Vec<Arc<RoleDescriptor>>> = HashMap::new();

        for class in classes {
            if self.by_type.contains_key(&class.type_id()) {
                continue;
            }
            let Some(handler) = self.handlers.iter().find(|h| h.is_artifact(class)) else {
                debug!(class = class.full_name(), "Not an artifact");
                continue;
            };

            let descriptor = Arc::new(handler.classify(class));
            let key = (descriptor.logical_name().to_string(), descriptor.role_type());
            if let Some(existing) = self.by_name.get(&key) {
                warn!(
                    class = class.full_name(),
                    existing = existing.full_name(),
                    role = %key.1,
                    "Logical name already taken, skipping"
                );
                continue;
            }

            debug!(
                class = class.full_name(),
                role = %descriptor.role_type(),
                name = descriptor.logical_name(),
                "Classified"
            );
            self.by_name.insert(key, descriptor.clone());
            self.by_full_name
                .insert(descriptor.full_name().to_string(), descriptor.clone());
            self.by_type.insert(class.type_id(), descriptor.clone());
            fresh.entry(descriptor.role_type()).or_default().push(descriptor);
        }

        let count = fresh.values().map(Vec::len).sum();
        for handler in &self.handlers {
            if let Some(descriptors) = fresh.get(&handler.role_type()) {
                handler.initialize(descriptors);
            }
        }
        info!(count, total = self.by_type.len(), "Scan complete");
        count
    }

    /// Looks up an artifact by name and role. Qualified names are reduced to their last
    /// segment and the role suffix is optional.
    pub fn find_by_name_and_type(&self, name: &str, role: RoleType) -> Option<Arc<RoleDescriptor>> {
        let handler = self.handler(role)?;
        let key = (logical_name(name, handler.suffix()), role);
        self.by_name.get(&key).cloned()
    }

    pub fn find_by_class(&self, class: &ArtifactClass) -> Option<Arc<RoleDescriptor>> {
        self.by_type.get(&class.type_id()).cloned()
    }

    pub fn find_by_type<T: 'static>(&self) -> Option<Arc<RoleDescriptor>> {
        self.by_type.get(&TypeId::of::<T>()).cloned()
    }

    pub fn find_by_full_name(&self, full_name: &str) -> Option<Arc<RoleDescriptor>> {
        self.by_full_name.get(full_name).cloned()
    }

    /// Every descriptor of `role`, sorted by full name. Empty if there are none.
    pub fn all_of_type(&self, role: RoleType) -> Vec<Arc<RoleDescriptor>> {
        let mut descriptors: Vec<_> = self
            .by_type
            .values()
            .filter(|d| d.role_type() == role)
            .cloned()
            .collect();
        descriptors.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        descriptors
    }

    pub fn handler(&self, role: RoleType) -> Option<&Arc<dyn ArtifactHandler>> {
        self.handlers.iter().find(|h| h.role_type() == role)
    }

    /// Registered role types, in registration order.
    pub fn role_types(&self) -> Vec<RoleType> {
        self.handlers.iter().map(|h| h.role_type()).collect()
    }

    /// Number of classified artifacts.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
