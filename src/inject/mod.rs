//! # Dependency Injection
//!
//! The group manager never constructs role-objects itself. It hands every
//! [`ArtifactClass`](crate::framework::ArtifactClass) to an [`Injector`] together with an
//! [`InjectionRequest`] describing the group being built.
//!
//! [`DefaultInjector`] covers the common case: it runs the class constructor, exposes
//! type-keyed [`ServiceBindings`] and the group args through an [`InjectionContext`], and
//! calls [`Artifact::inject`](crate::framework::Artifact::inject) for member injection.
//!
//! ```rust
//! use std::sync::Arc;
//! use mvc_lifecycle::inject::{DefaultInjector, ServiceBindings};
//!
//! struct Clock;
//!
//! let mut bindings = ServiceBindings::new();
//! bindings.bind(Arc::new(Clock));
//! let injector = DefaultInjector::new(bindings);
//! assert!(injector.bindings().get::<Clock>().is_some());
//! ```

pub mod injector;

pub use injector::{DefaultInjector, InjectionContext, InjectionRequest, Injector, ServiceBindings};
