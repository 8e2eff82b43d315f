//! # Artifact Contract
//!
//! Every object that can take part in a group implements [`Artifact`]. The trait has
//! only provided methods, so a plain struct becomes an artifact with an empty `impl`
//! block and opts into the hooks it cares about:
//!
//! - [`Artifact::references`] / [`Artifact::wire`] - sibling wiring (second pass of creation)
//! - [`Artifact::inject`] - member injection, called by the injector right after construction
//! - [`Artifact::init`] / [`Artifact::destroy`] - async lifecycle hooks
//! - [`Artifact::release`] - drop sibling references at teardown
//!
//! Types are described to the registry through [`ArtifactClass`], the Rust stand-in for
//! a runtime class: a name, a `TypeId`, an optional declared role and a constructor.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::framework::{BoxError, GroupArgs, InjectError, WiringError};
use crate::inject::InjectionContext;
use crate::threading::InteractionExecutor;

// =============================================================================
// ROLE TYPES
// =============================================================================

/// The closed set of roles an artifact can play inside a group.
///
/// Declaration order is the order members are constructed, wired and initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Model,
    Service,
    View,
    Controller,
}

impl RoleType {
    pub const ALL: [RoleType; 4] = [
        RoleType::Model,
        RoleType::Service,
        RoleType::View,
        RoleType::Controller,
    ];

    /// Lowercase tag used in configuration files and events.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Service => "service",
            Self::View => "view",
            Self::Controller => "controller",
        }
    }

    /// Naming-convention suffix (`SampleController` is a controller).
    pub fn default_suffix(&self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Service => "Service",
            Self::View => "View",
            Self::Controller => "Controller",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("Unknown role type: {0}")]
pub struct UnknownRoleType(pub String);

impl FromStr for RoleType {
    type Err = UnknownRoleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleType::ALL
            .into_iter()
            .find(|role| role.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRoleType(s.to_string()))
    }
}

// =============================================================================
// THE ARTIFACT TRAIT
// =============================================================================

/// Upcast helper so `Arc<dyn Artifact>` can be downcast to its concrete type.
pub trait AsAny: Any + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Downcasts a type-erased role-object.
pub fn downcast_artifact<T: Artifact>(object: &Arc<dyn Artifact>) -> Option<Arc<T>> {
    Arc::clone(object).into_any().downcast::<T>().ok()
}

/// Contract for role-objects managed by the group lifecycle.
///
/// # Hooks run off the interaction thread
/// Hooks run on the caller's task. A hook that must touch interaction-thread state
/// hops there itself through [`HookContext::executor`].
#[async_trait]
pub trait Artifact: AsAny {
    /// Roles this object wants references to. The manager resolves each one to the
    /// sibling in the same group and calls [`Artifact::wire`].
    fn references(&self) -> &[RoleType] {
        &[]
    }

    /// Receives the sibling that plays `role`.
    fn wire(&self, _role: RoleType, _sibling: &Arc<dyn Artifact>) -> Result<(), WiringError> {
        Ok(())
    }

    /// Member injection, after construction and before wiring.
    fn inject(&self, _ctx: &InjectionContext<'_>) -> Result<(), InjectError> {
        Ok(())
    }

    /// Called once every member of the group has been wired.
    async fn init(&self, _ctx: &HookContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called when the group is torn down, or rolled back after a failed creation.
    async fn destroy(&self, _ctx: &HookContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Drops sibling references. Called after every destroy hook has run.
    fn release(&self) {}
}

/// Constructors for artifacts that can be built by the default injector.
pub trait Construct: Artifact + Sized {
    fn construct(ctx: &InjectionContext<'_>) -> Result<Self, BoxError>;
}

// =============================================================================
// ARTIFACT CLASSES
// =============================================================================

type Constructor =
    Arc<dyn Fn(&InjectionContext<'_>) -> Result<Arc<dyn Artifact>, BoxError> + Send + Sync>;

/// Runtime description of an artifact type.
#[derive(Clone)]
pub struct ArtifactClass {
    full_name: String,
    type_id: TypeId,
    declared_role: Option<RoleType>,
    constructor: Constructor,
}

impl ArtifactClass {
    /// Describes `T`, named after its Rust type path.
    pub fn of<T: Construct>() -> Self {
        Self {
            full_name: type_name::<T>().to_string(),
            type_id: TypeId::of::<T>(),
            declared_role: None,
            constructor: Arc::new(construct_erased::<T>),
        }
    }

    /// Describes `T` with an explicit role, bypassing the naming convention.
    pub fn with_role<T: Construct>(role: RoleType) -> Self {
        Self {
            declared_role: Some(role),
            ..Self::of::<T>()
        }
    }

    /// Overrides the name the class is registered under.
    pub fn named(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The last path segment of [`ArtifactClass::full_name`].
    pub fn simple_name(&self) -> &str {
        last_segment(&self.full_name)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn declared_role(&self) -> Option<RoleType> {
        self.declared_role
    }

    /// Runs the constructor. Only injectors should call this.
    pub fn instantiate(&self, ctx: &InjectionContext<'_>) -> Result<Arc<dyn Artifact>, BoxError> {
        (self.constructor)(ctx)
    }
}

impl fmt::Debug for ArtifactClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactClass")
            .field("full_name", &self.full_name)
            .field("declared_role", &self.declared_role)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ArtifactClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

fn construct_erased<T: Construct>(ctx: &InjectionContext<'_>) -> Result<Arc<dyn Artifact>, BoxError> {
    Ok(Arc::new(T::construct(ctx)?))
}

/// Part of a qualified name after the last `::`, `.` or `/`.
pub(crate) fn last_segment(name: &str) -> &str {
    name.rsplit(['.', '/', ':']).next().unwrap_or(name)
}

// =============================================================================
// SIBLING REFERENCES
// =============================================================================

/// A slot holding a weak reference to a sibling role-object.
///
/// The group owns its members strongly; siblings only point at each other weakly, so
/// a wired group never forms a reference cycle.
pub struct Sibling<T> {
    slot: RwLock<Option<Weak<T>>>,
}

impl<T: Artifact> Sibling<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Downcasts `sibling` and stores it.
    pub fn bind(&self, role: RoleType, sibling: &Arc<dyn Artifact>) -> Result<(), WiringError> {
        let typed = downcast_artifact::<T>(sibling).ok_or(WiringError::TypeMismatch {
            role,
            expected: type_name::<T>(),
        })?;
        *self.slot.write() = Some(Arc::downgrade(&typed));
        Ok(())
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().as_ref().and_then(Weak::upgrade)
    }

    pub fn is_bound(&self) -> bool {
        self.get().is_some()
    }

    pub fn clear(&self) {
        self.slot.write().take();
    }
}

impl<T: Artifact> Default for Sibling<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HOOK CONTEXT
// =============================================================================

/// Everything a lifecycle hook gets to see about its group.
#[derive(Clone)]
pub struct HookContext {
    group_id: String,
    template: String,
    args: GroupArgs,
    executor: Arc<dyn InteractionExecutor>,
}

impl HookContext {
    pub fn new(
        group_id: impl Into<String>,
        template: impl Into<String>,
        args: GroupArgs,
        executor: Arc<dyn InteractionExecutor>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            template: template.into(),
            args,
            executor,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Creation args merged over the template defaults.
    pub fn args(&self) -> &GroupArgs {
        &self.args
    }

    pub fn executor(&self) -> &Arc<dyn InteractionExecutor> {
        &self.executor
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("group_id", &self.group_id)
            .field("template", &self.template)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
