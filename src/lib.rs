//! # MVC Lifecycle
//!
//! > **Groups of role-objects, created, wired and torn down as one unit.**
//!
//! Application types play *roles*: model, service, view or controller. This crate
//! classifies those types in an [`ArtifactRegistry`](registry::ArtifactRegistry) and lets
//! a [`GroupManager`](lifecycle::GroupManager) instantiate named groups of them from
//! templates, wire the members to each other, run their hooks and dispose of them again.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Construct first, wire second
//! Members often reference each other (a view needs its model, a controller needs
//! both). Every member of a group is constructed before any of them is wired, so
//! construction order never matters and cycles are fine.
//!
//! ### Weak siblings
//! The group owns its members. Members only hold [`Sibling`](framework::Sibling)
//! references to each other, which are weak and cleared on release, so nothing
//! outlives its group.
//!
//! ### All or nothing
//! A group is either fully live or gone. If any step of creation fails, every member
//! already built gets its destroy hook and the caller sees one
//! [`GroupInitialization`](framework::GroupError::GroupInitialization) error.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each layer has its own `thiserror` enum ([`RegistryError`](framework::RegistryError),
//! [`InjectError`](framework::InjectError), [`GroupError`](framework::GroupError),
//! [`ConfigError`](config::ConfigError)). Hooks return boxed errors that are kept as the
//! `source` of the group-level error.
//!
//! ### 2. Collaborators as Traits
//! Construction ([`Injector`](inject::Injector)), event delivery
//! ([`EventPublisher`](events::EventPublisher)) and the interaction thread
//! ([`InteractionExecutor`](threading::InteractionExecutor)) are traits with default
//! implementations, swapped in through the manager's builder.
//!
//! ### 3. Concurrency Model
//! `create` and `destroy` are async and run on the caller's task. Each group has its own
//! lifecycle lock, so different groups proceed independently while create and destroy
//! of the same id are strictly ordered.
//!
//! ### 4. Observability
//! `tracing` everywhere, with `group_id`, `template` and `role` as structured fields.
//! See the [`lifecycle::tracing`] module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Contract ([`framework`])
//! - **Role**: What a role-object is and how it is described.
//! - **Key items**: [`Artifact`](framework::Artifact), [`RoleType`](framework::RoleType),
//!   [`ArtifactClass`](framework::ArtifactClass).
//!
//! ### 2. The Index ([`registry`])
//! - **Role**: Classifies classes into roles and resolves configured names.
//! - **Key items**: [`ArtifactRegistry`](registry::ArtifactRegistry),
//!   [`ArtifactHandler`](registry::ArtifactHandler).
//!
//! ### 3. The Collaborators ([`inject`], [`events`], [`threading`], [`config`])
//! - **Role**: Construction, lifecycle notifications, the interaction thread, templates.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: Creates, tracks and destroys groups.
//! - **Key items**: [`GroupManager`](lifecycle::GroupManager),
//!   [`GroupInstance`](lifecycle::GroupInstance).
//!
//! ### 5. The Example ([`sample`])
//! - **Role**: A model/view/controller triple that uses every hook.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with lifecycle logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod config;
pub mod events;
pub mod framework;
pub mod inject;
pub mod lifecycle;
pub mod registry;
pub mod sample;
pub mod threading;
