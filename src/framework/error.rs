//! # Framework Errors
//!
//! This module defines the error types shared by the registry, the injector and the
//! group lifecycle manager. Centralizing them keeps error handling uniform: callers
//! match on [`GroupError`] for lifecycle failures and on [`RegistryError`] for startup
//! configuration problems.

use std::fmt;

use crate::framework::RoleType;

/// Error type returned by role-object hooks and constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building the artifact registry.
///
/// These are configuration errors: they surface at startup and are not recoverable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("Role type '{0}' is already registered")]
    DuplicateRole(RoleType),
}

/// Errors raised while cross-wiring the members of a group.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WiringError {
    #[error("Role '{role}' wants a '{wanted}' sibling but the group has none")]
    MissingSibling { role: RoleType, wanted: RoleType },
    #[error("Sibling for role '{role}' is not a {expected}")]
    TypeMismatch {
        role: RoleType,
        expected: &'static str,
    },
}

/// Errors raised by an [`Injector`](crate::inject::Injector).
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("Failed to construct {class}: {source}")]
    Construction {
        class: String,
        #[source]
        source: BoxError,
    },
    #[error("No binding registered for {0}")]
    MissingBinding(&'static str),
    #[error("Member injection failed for {class}: {source}")]
    Members {
        class: String,
        #[source]
        source: BoxError,
    },
}

/// The creation step at which a group failed to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStage {
    /// Looking up the descriptor of every role in the registry.
    Resolve,
    /// Constructing role-objects and injecting their members.
    Instantiate,
    /// Handing every role-object references to its siblings.
    Wire,
    /// Running the init hooks.
    Init,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Resolve => "resolve",
            Self::Instantiate => "instantiate",
            Self::Wire => "wire",
            Self::Init => "init",
        };
        f.write_str(stage)
    }
}

/// A single destroy hook that failed.
#[derive(Debug, thiserror::Error)]
#[error("{role} destroy hook of group '{group_id}' failed: {source}")]
pub struct HookFailure {
    pub group_id: String,
    pub role: RoleType,
    #[source]
    pub source: BoxError,
}

/// Errors surfaced by the [`GroupManager`](crate::lifecycle::GroupManager).
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("Unknown group template: {0}")]
    UnknownGroupTemplate(String),

    #[error("Group instance id already in use: {0}")]
    InstanceIdInUse(String),

    #[error("Group not found: {0}")]
    NotFound(String),

    #[error("Template '{template}' binds {role} to '{class}', which is not a registered {role} artifact")]
    InvalidTemplate {
        template: String,
        role: RoleType,
        class: String,
    },

    /// Creation failed. The partially built group has already been torn down.
    #[error("Group '{id}' failed during {stage}: {source}")]
    GroupInitialization {
        id: String,
        stage: InitStage,
        #[source]
        source: BoxError,
    },

    /// One or more destroy hooks failed. The group was still removed.
    #[error("{} destroy hook(s) failed for group '{id}'", .failures.len())]
    HookFailures {
        id: String,
        failures: Vec<HookFailure>,
    },
}
