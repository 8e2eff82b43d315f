//! # Sample Application
//!
//! A small model/view/controller triple used by the demo binary and the integration
//! tests. It exercises every part of the lifecycle:
//!
//! - [`SampleModel`] reads its title from the group args
//! - [`SampleView`] references the model and mounts itself on the interaction thread
//! - [`SampleController`] references both siblings and gets a [`Greeter`] service
//!   injected from the injector's bindings
//!
//! ```rust,ignore
//! let manager = GroupManager::builder(Arc::new(sample::registry()))
//!     .config(AppConfig::from_yaml_str(sample::CONFIG)?)
//!     .injector(Arc::new(DefaultInjector::new(sample::bindings())))
//!     .build();
//! ```

pub mod controller;
pub mod greeter;
pub mod model;
pub mod view;

pub use controller::SampleController;
pub use greeter::Greeter;
pub use model::SampleModel;
pub use view::SampleView;

use crate::framework::ArtifactClass;
use crate::inject::ServiceBindings;
use crate::registry::ArtifactRegistry;

/// Group templates for the sample classes.
pub const CONFIG: &str = r#"
groups:
  sample:
    model: app::SampleModel
    view: SampleView
    controller: sample
    args:
      title: "Hello"
  status:
    model: SampleModel
    args:
      title: "Status"
"#;

pub fn classes() -> Vec<ArtifactClass> {
    vec![
        ArtifactClass::of::<SampleModel>(),
        ArtifactClass::of::<SampleView>(),
        ArtifactClass::of::<SampleController>(),
    ]
}

/// A convention-based registry with the sample classes scanned.
pub fn registry() -> ArtifactRegistry {
    let mut registry = ArtifactRegistry::with_conventions();
    registry.scan(&classes());
    registry
}

/// Service bindings the sample controller expects.
pub fn bindings() -> ServiceBindings {
    let mut bindings = ServiceBindings::new();
    bindings.bind(std::sync::Arc::new(Greeter::default()));
    bindings
}
