//! # Lifecycle Events
//!
//! The group manager announces every lifecycle transition through an
//! [`EventPublisher`]. [`EventRouter`] is the in-process implementation: listeners are
//! called synchronously, on the publishing thread, in subscription order.
//!
//! For one group id, listeners always observe
//! `GroupCreated` → `GroupDestroying` → `GroupDestroyed`.
//!
//! ## Reentrancy
//!
//! Dispatch is direct. A listener may create or destroy *other* groups, but it must not
//! create or destroy the group it is being notified about: the manager holds that
//! group's lifecycle lock while publishing, so doing so would deadlock.

pub mod router;

pub use router::{EventKind, EventPublisher, EventRouter, GroupEvent, Listener, ListenerId};
