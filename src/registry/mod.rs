//! Artifact classification.
//!
//! - [`ArtifactRegistry`] - Indexes classified artifacts by name, full name and type
//! - [`ArtifactHandler`] - Classifier capability (`is_artifact`, `classify`, `initialize`)
//! - [`ConventionHandler`] - Classifier by declared role or naming suffix
//! - [`RoleDescriptor`] - Result of classifying one class

pub mod core;
pub mod handler;

pub use self::core::ArtifactRegistry;
pub use handler::{logical_name, ArtifactHandler, ConventionHandler, RoleDescriptor};
