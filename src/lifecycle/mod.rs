//! # Group Lifecycle & Orchestration
//!
//! This module turns group templates into live groups and tears them down again.
//!
//! ## The Orchestration Pattern
//!
//! Individual role-objects are simple; **wiring them together** is where the complexity
//! lives. The [`GroupManager`] is the conductor:
//!
//! 1. **Creation** - resolve each role's class through the registry and construct it
//! 2. **Dependency Injection** - fill fields from creation args and service bindings
//! 3. **Cross-wiring** - hand each member the siblings it references, after all exist
//! 4. **Initialization** - run init hooks in role order (model, service, view, controller)
//! 5. **Teardown** - destroy hooks, release, and lifecycle events in a fixed order
//!
//! ```rust,ignore
//! let manager = GroupManager::builder(Arc::new(registry))
//!     .config(AppConfig::from_path("groups.yaml")?)
//!     .build();
//!
//! let group = manager.create("sample", Some("main"), GroupArgs::new()).await?;
//! let model: Arc<SampleModel> = manager
//!     .find_role_instance("main", RoleType::Model)
//!     .expect("live");
//!
//! manager.shutdown().await.ok();
//! ```
//!
//! ## Main Components
//!
//! - [`GroupManager`] / [`GroupManagerBuilder`] - the public lifecycle API
//! - [`GroupInstance`] - one group: id, args, members, state, parent and children
//! - [`LiveTable`] - id → instance, shared by every caller
//! - [`setup_tracing`] - subscriber setup for binaries and demos

pub mod group;
pub mod manager;
pub mod table;
pub mod tracing;

pub use group::{GroupInstance, GroupState};
pub use manager::{GroupManager, GroupManagerBuilder};
pub use table::LiveTable;
pub use tracing::setup_tracing;
