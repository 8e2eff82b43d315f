//! Building blocks shared by every layer of the crate.
//!
//! # Main Components
//!
//! - [`Artifact`] - Trait that role-objects implement to be managed in groups
//! - [`RoleType`] - The closed set of roles (model, service, view, controller)
//! - [`ArtifactClass`] - Runtime description of an artifact type
//! - [`Sibling`] - Weak reference slot filled during cross-wiring
//! - [`GroupArgs`] - Creation arguments
//! - [`GroupError`] and friends - Common error types
//!
//! # Testing
//!
//! See [`mock`] for test doubles of the event publisher.

pub mod args;
pub mod artifact;
pub mod error;
pub mod mock;

pub use args::GroupArgs;
pub use artifact::{
    downcast_artifact, Artifact, ArtifactClass, AsAny, Construct, HookContext, RoleType, Sibling,
    UnknownRoleType,
};
pub use error::{
    BoxError, GroupError, HookFailure, InitStage, InjectError, RegistryError, WiringError,
};
