//! # Group Instances
//!
//! A [`GroupInstance`] is one live set of role-objects sharing an id. Instances are
//! created and mutated only by the [`GroupManager`](crate::lifecycle::GroupManager);
//! callers get shared, read-only handles.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::framework::{downcast_artifact, Artifact, GroupArgs, RoleType};

/// Lifecycle state of a group instance.
///
/// `Pending → Wired → Initialized → Live → Destroying → Destroyed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupState {
    Pending,
    Wired,
    Initialized,
    Live,
    Destroying,
    Destroyed,
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            Self::Pending => "pending",
            Self::Wired => "wired",
            Self::Initialized => "initialized",
            Self::Live => "live",
            Self::Destroying => "destroying",
            Self::Destroyed => "destroyed",
        };
        f.write_str(state)
    }
}

pub struct GroupInstance {
    id: String,
    template: String,
    args: GroupArgs,
    parent: Mutex<Option<String>>,
    children: Mutex<Vec<String>>,
    members: RwLock<Vec<(RoleType, Arc<dyn Artifact>)>>,
    state: Mutex<GroupState>,
    lifecycle: Arc<tokio::sync::Mutex<()>>,
}

impl GroupInstance {
    pub(crate) fn new(
        id: String,
        template: impl Into<String>,
        args: GroupArgs,
        parent: Option<String>,
    ) -> Self {
        Self {
            id,
            template: template.into(),
            args,
            parent: Mutex::new(parent),
            children: Mutex::new(Vec::new()),
            members: RwLock::new(Vec::new()),
            state: Mutex::new(GroupState::Pending),
            lifecycle: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Creation args merged over the template defaults.
    pub fn args(&self) -> &GroupArgs {
        &self.args
    }

    pub fn state(&self) -> GroupState {
        *self.state.lock()
    }

    pub fn is_live(&self) -> bool {
        self.state() == GroupState::Live
    }

    pub fn parent(&self) -> Option<String> {
        self.parent.lock().clone()
    }

    pub fn children(&self) -> Vec<String> {
        self.children.lock().clone()
    }

    /// Roles populated in this group, in role order.
    pub fn roles(&self) -> Vec<RoleType> {
        self.members.read().iter().map(|(role, _)| *role).collect()
    }

    pub fn members(&self) -> Vec<(RoleType, Arc<dyn Artifact>)> {
        self.members.read().clone()
    }

    pub fn member(&self, role: RoleType) -> Option<Arc<dyn Artifact>> {
        self.members
            .read()
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, object)| Arc::clone(object))
    }

    /// The member playing `role`, typed as `T`.
    pub fn member_as<T: Artifact>(&self, role: RoleType) -> Option<Arc<T>> {
        self.member(role).and_then(|object| downcast_artifact::<T>(&object))
    }

    pub(crate) fn lifecycle_lock(&self) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(&self.lifecycle)
    }

    pub(crate) fn set_state(&self, state: GroupState) {
        *self.state.lock() = state;
    }

    pub(crate) fn push_member(&self, role: RoleType, object: Arc<dyn Artifact>) {
        self.members.write().push((role, object));
    }

    pub(crate) fn take_members(&self) -> Vec<(RoleType, Arc<dyn Artifact>)> {
        std::mem::take(&mut *self.members.write())
    }

    /// Records a child unless teardown has already started.
    pub(crate) fn add_child(&self, child_id: &str) -> bool {
        let state = self.state.lock();
        if matches!(*state, GroupState::Destroying | GroupState::Destroyed) {
            return false;
        }
        self.children.lock().push(child_id.to_string());
        true
    }

    /// Marks the group as tearing down. Children added before this call are returned.
    pub(crate) fn begin_teardown(&self, state: GroupState) -> Vec<String> {
        let mut current = self.state.lock();
        *current = state;
        self.children.lock().clone()
    }

    pub(crate) fn remove_child(&self, child_id: &str) -> bool {
        let mut children = self.children.lock();
        let before = children.len();
        children.retain(|c| c != child_id);
        children.len() != before
    }

    pub(crate) fn clear_parent(&self) -> Option<String> {
        self.parent.lock().take()
    }
}

impl fmt::Debug for GroupInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupInstance")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("state", &self.state())
            .field("roles", &self.roles())
            .field("parent", &self.parent())
            .field("children", &self.children())
            .finish()
    }
}
