//! # Interaction Thread
//!
//! Some role-objects own state that may only be touched from one designated thread
//! (the thread that owns the toolkit's live widgets). The lifecycle manager itself
//! never needs that thread; hooks that do hop there through the
//! [`InteractionExecutor`] found in their [`HookContext`](crate::framework::HookContext).
//!
//! - [`InteractionThread`] - A dedicated OS thread draining a task channel
//! - [`InlineExecutor`] - Runs every task on the calling thread (headless use)
//! - [`call_sync`] - Runs a closure on the interaction thread and returns its value

pub mod executor;

pub use executor::{call_sync, ExecutorError, InlineExecutor, InteractionExecutor, InteractionThread, Task};
