//! # Artifact Handlers
//!
//! An [`ArtifactHandler`] is the classifier for one role type. The registry offers every
//! candidate class to its handlers; the handler that claims a class turns it into a
//! [`RoleDescriptor`].

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::framework::{ArtifactClass, RoleType};

/// Classification of one artifact class under one role.
#[derive(Debug, Clone)]
pub struct RoleDescriptor {
    role_type: RoleType,
    suffix: String,
    class: ArtifactClass,
    logical_name: String,
}

impl RoleDescriptor {
    pub fn new(role_type: RoleType, suffix: impl Into<String>, class: ArtifactClass) -> Self {
        let suffix = suffix.into();
        let logical_name = logical_name(class.full_name(), &suffix);
        Self {
            role_type,
            suffix,
            class,
            logical_name,
        }
    }

    pub fn role_type(&self) -> RoleType {
        self.role_type
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn class(&self) -> &ArtifactClass {
        &self.class
    }

    pub fn full_name(&self) -> &str {
        self.class.full_name()
    }

    pub fn simple_name(&self) -> &str {
        self.class.simple_name()
    }

    /// Simple name without the role suffix, first letter lower-cased
    /// (`app::SampleController` is `sample`).
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }
}

/// Normalizes a class reference to its logical name.
///
/// Accepts qualified (`app::SampleModel`, `app.SampleModel`), simple (`SampleModel`)
/// or logical (`sample`) forms.
pub fn logical_name(name: &str, suffix: &str) -> String {
    let simple = crate::framework::artifact::last_segment(name);
    let base = match simple.strip_suffix(suffix) {
        Some(stripped) if !suffix.is_empty() && !stripped.is_empty() => stripped,
        _ => simple,
    };
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Classifier capability for one role type.
pub trait ArtifactHandler: Send + Sync {
    fn role_type(&self) -> RoleType;

    /// Naming suffix of the role; may be empty.
    fn suffix(&self) -> &str;

    /// Whether `class` belongs to this handler's role.
    fn is_artifact(&self, class: &ArtifactClass) -> bool;

    /// Builds the descriptor of a class this handler claimed.
    fn classify(&self, class: &ArtifactClass) -> RoleDescriptor {
        RoleDescriptor::new(self.role_type(), self.suffix(), class.clone())
    }

    /// Receives the descriptors classified by the latest scan.
    fn initialize(&self, _descriptors: &[Arc<RoleDescriptor>]) {}
}

/// Handler that claims classes by explicit role declaration or naming convention.
///
/// A class declaring a role belongs to that role only. A class without a declaration
/// belongs to the role whose suffix ends its simple name.
pub struct ConventionHandler {
    role_type: RoleType,
    suffix: String,
    classes: RwLock<Vec<Arc<RoleDescriptor>>>,
}

impl ConventionHandler {
    pub fn new(role_type: RoleType) -> Self {
        Self::with_suffix(role_type, role_type.default_suffix())
    }

    pub fn with_suffix(role_type: RoleType, suffix: impl Into<String>) -> Self {
        Self {
            role_type,
            suffix: suffix.into(),
            classes: RwLock::new(Vec::new()),
        }
    }

    /// One handler per role type, each with its default suffix.
    pub fn all() -> Vec<Arc<dyn ArtifactHandler>> {
        RoleType::ALL
            .into_iter()
            .map(|role| Arc::new(ConventionHandler::new(role)) as Arc<dyn ArtifactHandler>)
            .collect()
    }

    /// Descriptors this handler has been initialized with so far.
    pub fn classes(&self) -> Vec<Arc<RoleDescriptor>> {
        self.classes.read().clone()
    }
}

impl ArtifactHandler for ConventionHandler {
    fn role_type(&self) -> RoleType {
        self.role_type
    }

    fn suffix(&self) -> &str {
        &self.suffix
    }

    fn is_artifact(&self, class: &ArtifactClass) -> bool {
        match class.declared_role() {
            Some(role) => role == self.role_type,
            None => !self.suffix.is_empty() && class.simple_name().ends_with(&self.suffix),
        }
    }

    fn initialize(&self, descriptors: &[Arc<RoleDescriptor>]) {
        debug!(role = %self.role_type, count = descriptors.len(), "Handler initialized");
        self.classes.write().extend(descriptors.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_name_forms() {
        assert_eq!(logical_name("app::SampleController", "Controller"), "sample");
        assert_eq!(logical_name("SampleController", "Controller"), "sample");
        assert_eq!(logical_name("com.acme.SampleController", "Controller"), "sample");
        assert_eq!(logical_name("sample", "Controller"), "sample");
        assert_eq!(logical_name("Controller", "Controller"), "controller");
        assert_eq!(logical_name("OrderEntry", ""), "orderEntry");
    }
}
