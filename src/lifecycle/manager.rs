//! # Group Lifecycle Manager
//!
//! [`GroupManager`] owns the full lifecycle of groups: it instantiates every role of a
//! template, cross-wires the members, runs their init hooks, tracks the result in the
//! [`LiveTable`] and tears it down again as a unit.
//!
//! ## Creation
//!
//! 1. **Reserve** - the id (explicit or `"{template}-{n}"`) is inserted into the table
//!    with the group's lifecycle lock already held.
//! 2. **Resolve** - every role's class name is looked up in the registry.
//! 3. **Instantiate** - the injector constructs each member and injects its fields.
//! 4. **Wire** - once *all* members exist, each one receives the siblings it asked for.
//!    Two passes avoid construction-order cycles.
//! 5. **Init** - init hooks run in role order.
//! 6. **Publish** - the group goes live and `GroupCreated` is published.
//!
//! Any failure in steps 2-5 (a panicking init hook included) rolls back: every constructed member gets its destroy hook
//! exactly once, child groups are destroyed, the reservation is dropped and the caller
//! receives [`GroupError::GroupInitialization`]. No lifecycle event is published for a
//! group that never went live.
//!
//! ## Destruction
//!
//! `GroupDestroying` → child groups → destroy hooks (all attempted; errors and panics collected)
//! → release references → `GroupDestroyed` → removal from the table. Hook failures are
//! reported as [`GroupError::HookFailures`] after teardown completed.
//!
//! ## Ordering
//!
//! Create holds the group's lifecycle lock until `GroupCreated` is published, destroy
//! holds it until `GroupDestroyed` is published, and the id stays in the table until
//! then. A destroy racing a create of the same id therefore waits for the create, and an
//! id is only reusable once the previous instance is completely gone.

use std::any::Any;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, GroupTemplate};
use crate::events::{EventPublisher, EventRouter, GroupEvent};
use crate::framework::{
    Artifact, BoxError, GroupArgs, GroupError, HookContext, HookFailure, InitStage, RoleType,
    WiringError,
};
use crate::inject::{DefaultInjector, InjectionRequest, Injector};
use crate::lifecycle::group::{GroupInstance, GroupState};
use crate::lifecycle::table::LiveTable;
use crate::registry::ArtifactRegistry;
use crate::threading::{InlineExecutor, InteractionExecutor};

/// Creation failure, before it is wrapped into [`GroupError::GroupInitialization`].
struct AssemblyError {
    stage: InitStage,
    source: BoxError,
}

impl AssemblyError {
    fn new(stage: InitStage, source: impl Into<BoxError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

pub struct GroupManager {
    registry: Arc<ArtifactRegistry>,
    templates: BTreeMap<String, GroupTemplate>,
    injector: Arc<dyn Injector>,
    publisher: Arc<dyn EventPublisher>,
    executor: Arc<dyn InteractionExecutor>,
    table: Arc<LiveTable>,
    next_id: AtomicU64,
}

impl GroupManager {
    pub fn builder(registry: Arc<ArtifactRegistry>) -> GroupManagerBuilder {
        GroupManagerBuilder::new(registry)
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Creates a group from `template`.
    ///
    /// Without `instance_id` a unique id is generated. `args` override the template's
    /// default args.
    #[instrument(skip(self, args))]
    pub async fn create(
        &self,
        template: &str,
        instance_id: Option<&str>,
        args: GroupArgs,
    ) -> Result<Arc<GroupInstance>, GroupError> {
        self.create_group(template, instance_id, args, None).await
    }

    /// Creates a group owned by `parent_id`; it is destroyed along with its parent
    /// unless [detached](GroupManager::detach) first.
    #[instrument(skip(self, args))]
    pub async fn create_child(
        &self,
        parent_id: &str,
        template: &str,
        instance_id: Option<&str>,
        args: GroupArgs,
    ) -> Result<Arc<GroupInstance>, GroupError> {
        let parent = self
            .table
            .get(parent_id)
            .ok_or_else(|| GroupError::NotFound(parent_id.to_string()))?;
        self.create_group(template, instance_id, args, Some(parent)).await
    }

    async fn create_group(
        &self,
        template_name: &str,
        instance_id: Option<&str>,
        args: GroupArgs,
        parent: Option<Arc<GroupInstance>>,
    ) -> Result<Arc<GroupInstance>, GroupError> {
        let template = self.templates.get(template_name).ok_or_else(|| {
            warn!(template = template_name, "Unknown group template");
            GroupError::UnknownGroupTemplate(template_name.to_string())
        })?;
        let args = template.args().merged(&args);
        let parent_id = parent.as_ref().map(|p| p.id().to_string());

        let (instance, _guard) = self.reserve(template, instance_id, args, parent_id).await?;
        let group_id = instance.id().to_string();

        if let Some(parent) = &parent {
            if !parent.add_child(&group_id) {
                warn!(group_id = %group_id, parent = parent.id(), "Parent is tearing down");
                instance.set_state(GroupState::Destroyed);
                self.table.remove(&instance);
                return Err(GroupError::NotFound(parent.id().to_string()));
            }
        }

        info!(group_id = %group_id, template = template_name, "Creating");
        if let Err(AssemblyError { stage, source }) = self.assemble(&instance, template).await {
            warn!(group_id = %group_id, %stage, error = %source, "Creation failed, rolling back");
            self.rollback(&instance).await;
            return Err(GroupError::GroupInitialization {
                id: group_id,
                stage,
                source,
            });
        }

        instance.set_state(GroupState::Live);
        info!(group_id = %group_id, roles = ?instance.roles(), live = self.table.live_count(), "Created");
        self.publisher.publish(&GroupEvent::Created {
            template: template_name.to_string(),
            group_id,
            members: instance.members(),
        });
        Ok(instance)
    }

    /// Inserts a fresh instance into the table, holding its lifecycle lock.
    async fn reserve(
        &self,
        template: &GroupTemplate,
        instance_id: Option<&str>,
        args: GroupArgs,
        parent: Option<String>,
    ) -> Result<(Arc<GroupInstance>, OwnedMutexGuard<()>), GroupError> {
        if let Some(id) = instance_id {
            let instance = Arc::new(GroupInstance::new(id.to_string(), template.name(), args, parent));
            let guard = instance.lifecycle_lock().lock_owned().await;
            if !self.table.insert_if_vacant(Arc::clone(&instance)) {
                warn!(group_id = id, "Instance id already in use");
                return Err(GroupError::InstanceIdInUse(id.to_string()));
            }
            return Ok((instance, guard));
        }

        loop {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let id = format!("{}-{}", template.name(), n);
            let instance = Arc::new(GroupInstance::new(
                id,
                template.name(),
                args.clone(),
                parent.clone(),
            ));
            let guard = instance.lifecycle_lock().lock_owned().await;
            if self.table.insert_if_vacant(Arc::clone(&instance)) {
                return Ok((instance, guard));
            }
            debug!(group_id = instance.id(), "Generated id taken, retrying");
        }
    }

    async fn assemble(
        &self,
        instance: &GroupInstance,
        template: &GroupTemplate,
    ) -> Result<(), AssemblyError> {
        let group_id = instance.id();

        let mut descriptors = Vec::new();
        for (role, class_name) in template.members() {
            let descriptor = self
                .registry
                .find_by_name_and_type(class_name, role)
                .ok_or_else(|| {
                    AssemblyError::new(
                        InitStage::Resolve,
                        GroupError::InvalidTemplate {
                            template: template.name().to_string(),
                            role,
                            class: class_name.to_string(),
                        },
                    )
                })?;
            descriptors.push((role, descriptor));
        }

        for (role, descriptor) in &descriptors {
            let request = InjectionRequest::new(group_id, *role, instance.args());
            let object = self
                .injector
                .create(descriptor.class(), &request)
                .map_err(|e| AssemblyError::new(InitStage::Instantiate, e))?;
            instance.push_member(*role, Arc::clone(&object));
            self.injector
                .inject_members(&object, &request)
                .map_err(|e| AssemblyError::new(InitStage::Instantiate, e))?;
            debug!(group_id, role = %role, class = descriptor.full_name(), "Instantiated");
        }

        let members = instance.members();
        for (role, object) in &members {
            for wanted in object.references() {
                let sibling = members
                    .iter()
                    .find(|(r, _)| r == wanted)
                    .map(|(_, sibling)| sibling)
                    .ok_or(WiringError::MissingSibling {
                        role: *role,
                        wanted: *wanted,
                    })
                    .map_err(|e| AssemblyError::new(InitStage::Wire, e))?;
                object
                    .wire(*wanted, sibling)
                    .map_err(|e| AssemblyError::new(InitStage::Wire, e))?;
            }
        }
        instance.set_state(GroupState::Wired);
        debug!(group_id, "Wired");

        let ctx = self.hook_context(instance);
        for (role, object) in &members {
            guarded(object.init(&ctx))
                .await
                .map_err(|source| AssemblyError {
                    stage: InitStage::Init,
                    source,
                })?;
            debug!(group_id, role = %role, "Init hook done");
        }
        instance.set_state(GroupState::Initialized);
        Ok(())
    }

    /// Tears down a group whose creation failed. No events are published.
    async fn rollback(&self, instance: &Arc<GroupInstance>) {
        let children = instance.begin_teardown(GroupState::Destroying);
        for child_id in children {
            if let Err(e) = self.destroy_group(child_id.clone()).await {
                warn!(group_id = instance.id(), child = %child_id, error = %e, "Child teardown failed during rollback");
            }
        }
        let failures = self.run_destroy_hooks(instance).await;
        self.release(instance);
        self.unlink_parent(instance);
        instance.set_state(GroupState::Destroyed);
        self.table.remove(instance);
        info!(group_id = instance.id(), hook_failures = failures.len(), "Rolled back");
    }

    // =========================================================================
    // DESTROY
    // =========================================================================

    /// Destroys a live group and its children.
    ///
    /// Unknown or already destroyed ids are ignored, so this is safe to call
    /// speculatively or more than once.
    #[instrument(skip(self))]
    pub async fn destroy(&self, id: &str) -> Result<(), GroupError> {
        self.destroy_group(id.to_string()).await
    }

    fn destroy_group(&self, id: String) -> BoxFuture<'_, Result<(), GroupError>> {
        async move {
            let Some(instance) = self.table.get(&id) else {
                debug!(group_id = %id, "Destroy of unknown group ignored");
                return Ok(());
            };
            let _guard = instance.lifecycle_lock().lock_owned().await;
            if !instance.is_live() {
                debug!(group_id = %id, state = %instance.state(), "Destroy of non-live group ignored");
                return Ok(());
            }

            info!(group_id = %id, "Destroying");
            self.publisher.publish(&GroupEvent::Destroying {
                template: instance.template().to_string(),
                group_id: id.clone(),
                members: instance.members(),
            });
            let children = instance.begin_teardown(GroupState::Destroying);

            let mut failures = Vec::new();
            for child_id in children {
                match self.destroy_group(child_id.clone()).await {
                    Ok(()) => {}
                    Err(GroupError::HookFailures { failures: nested, .. }) => failures.extend(nested),
                    Err(e) => warn!(group_id = %id, child = %child_id, error = %e, "Child teardown failed"),
                }
            }
            failures.extend(self.run_destroy_hooks(&instance).await);
            self.release(&instance);
            self.unlink_parent(&instance);
            instance.set_state(GroupState::Destroyed);

            info!(group_id = %id, hook_failures = failures.len(), "Destroyed");
            self.publisher.publish(&GroupEvent::Destroyed {
                template: instance.template().to_string(),
                group_id: id.clone(),
            });
            self.table.remove(&instance);

            if failures.is_empty() {
                Ok(())
            } else {
                Err(GroupError::HookFailures { id, failures })
            }
        }
        .boxed()
    }

    /// Runs every member's destroy hook, even after earlier ones failed or panicked.
    async fn run_destroy_hooks(&self, instance: &GroupInstance) -> Vec<HookFailure> {
        let ctx = self.hook_context(instance);
        let mut failures = Vec::new();
        for (role, object) in instance.members() {
            match guarded(object.destroy(&ctx)).await {
                Ok(()) => debug!(group_id = instance.id(), role = %role, "Destroy hook done"),
                Err(source) => {
                    warn!(group_id = instance.id(), role = %role, error = %source, "Destroy hook failed");
                    failures.push(HookFailure {
                        group_id: instance.id().to_string(),
                        role,
                        source,
                    });
                }
            }
        }
        failures
    }

    fn release(&self, instance: &GroupInstance) {
        for (_, object) in instance.take_members() {
            object.release();
        }
    }

    fn unlink_parent(&self, instance: &GroupInstance) {
        if let Some(parent_id) = instance.clear_parent() {
            if let Some(parent) = self.table.get(&parent_id) {
                parent.remove_child(instance.id());
            }
        }
    }

    /// Detaches a child group from its parent so it outlives the parent.
    ///
    /// Returns `false` if `child_id` is unknown or has no parent.
    pub fn detach(&self, child_id: &str) -> bool {
        let Some(child) = self.table.get(child_id) else {
            return false;
        };
        let Some(parent_id) = child.clear_parent() else {
            return false;
        };
        if let Some(parent) = self.table.get(&parent_id) {
            parent.remove_child(child_id);
        }
        info!(group_id = child_id, parent = %parent_id, "Detached");
        true
    }

    /// Destroys every live group. Returns the errors of the groups that reported any.
    pub async fn shutdown(&self) -> Result<(), Vec<GroupError>> {
        let mut roots: Vec<String> = self
            .table
            .live()
            .into_iter()
            .filter(|g| g.parent().is_none())
            .map(|g| g.id().to_string())
            .collect();
        roots.sort();
        info!(groups = roots.len(), "Shutting down");

        let mut errors = Vec::new();
        for id in roots {
            if let Err(e) = self.destroy(&id).await {
                errors.push(e);
            }
        }
        // Groups re-parented or created by listeners while the roots went down
        for id in self.table.live_ids() {
            if let Err(e) = self.destroy(&id).await {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    // =========================================================================
    // SCOPED USE
    // =========================================================================

    /// Creates a group, runs `body` with it and destroys it again.
    ///
    /// The group is destroyed even if `body` fails or panics. A `body` error wins over
    /// a destroy error; a panic is resumed after teardown.
    pub async fn with_group<F, Fut, R, E>(
        &self,
        template: &str,
        instance_id: Option<&str>,
        args: GroupArgs,
        body: F,
    ) -> Result<R, E>
    where
        F: FnOnce(Arc<GroupInstance>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<GroupError>,
    {
        let group = self.create(template, instance_id, args).await?;
        let id = group.id().to_string();

        let outcome = AssertUnwindSafe(async move { body(group).await })
            .catch_unwind()
            .await;
        let destroyed = self.destroy(&id).await;

        match outcome {
            Ok(Ok(value)) => {
                destroyed?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(e) = destroyed {
                    warn!(group_id = %id, error = %e, "Destroy failed after body error");
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(e) = destroyed {
                    warn!(group_id = %id, error = %e, "Destroy failed after body panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The member of a live group playing `role`, typed as `T`.
    pub fn find_role_instance<T: Artifact>(&self, id: &str, role: RoleType) -> Option<Arc<T>> {
        self.table.get_live(id)?.member_as::<T>(role)
    }

    pub fn find_group(&self, id: &str) -> Option<Arc<GroupInstance>> {
        self.table.get_live(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.table.get_live(id).is_some()
    }

    pub fn live_ids(&self) -> Vec<String> {
        self.table.live_ids()
    }

    /// Number of live groups.
    pub fn len(&self) -> usize {
        self.table.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn template(&self, name: &str) -> Option<&GroupTemplate> {
        self.templates.get(name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &GroupTemplate> {
        self.templates.values()
    }

    pub fn registry(&self) -> &Arc<ArtifactRegistry> {
        &self.registry
    }

    pub fn table(&self) -> &Arc<LiveTable> {
        &self.table
    }

    /// Checks that every template member resolves to a registered artifact.
    pub fn validate_templates(&self) -> Result<(), GroupError> {
        for template in self.templates.values() {
            for (role, class) in template.members() {
                if self.registry.find_by_name_and_type(class, role).is_none() {
                    return Err(GroupError::InvalidTemplate {
                        template: template.name().to_string(),
                        role,
                        class: class.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn hook_context(&self, instance: &GroupInstance) -> HookContext {
        HookContext::new(
            instance.id(),
            instance.template(),
            instance.args().clone(),
            Arc::clone(&self.executor),
        )
    }
}

/// Awaits a hook, reporting a panic as an error instead of unwinding through the manager.
async fn guarded<F>(hook: F) -> Result<(), BoxError>
where
    F: Future<Output = Result<(), BoxError>>,
{
    match AssertUnwindSafe(hook).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_message(payload).into()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => return "hook panicked".to_string(),
        },
    };
    format!("hook panicked: {detail}")
}

/// Builder for [`GroupManager`]. Collaborators default to [`DefaultInjector`],
/// [`EventRouter`], [`InlineExecutor`] and an empty [`LiveTable`].
pub struct GroupManagerBuilder {
    registry: Arc<ArtifactRegistry>,
    templates: BTreeMap<String, GroupTemplate>,
    injector: Option<Arc<dyn Injector>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    executor: Option<Arc<dyn InteractionExecutor>>,
    table: Option<Arc<LiveTable>>,
}

impl GroupManagerBuilder {
    pub fn new(registry: Arc<ArtifactRegistry>) -> Self {
        Self {
            registry,
            templates: BTreeMap::new(),
            injector: None,
            publisher: None,
            executor: None,
            table: None,
        }
    }

    pub fn template(mut self, template: GroupTemplate) -> Self {
        self.templates.insert(template.name().to_string(), template);
        self
    }

    pub fn templates(mut self, templates: impl IntoIterator<Item = GroupTemplate>) -> Self {
        for template in templates {
            self = self.template(template);
        }
        self
    }

    pub fn config(self, config: AppConfig) -> Self {
        self.templates(config.into_templates())
    }

    pub fn injector(mut self, injector: Arc<dyn Injector>) -> Self {
        self.injector = Some(injector);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn InteractionExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn table(mut self, table: Arc<LiveTable>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn build(self) -> GroupManager {
        GroupManager {
            registry: self.registry,
            templates: self.templates,
            injector: self
                .injector
                .unwrap_or_else(|| Arc::new(DefaultInjector::default())),
            publisher: self.publisher.unwrap_or_else(|| Arc::new(EventRouter::new())),
            executor: self.executor.unwrap_or_else(|| Arc::new(InlineExecutor)),
            table: self.table.unwrap_or_default(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{ArtifactClass, Construct};
    use crate::inject::InjectionContext;

    struct LoneModel;

    impl Construct for LoneModel {
        fn construct(_ctx: &InjectionContext<'_>) -> Result<Self, BoxError> {
            Ok(LoneModel)
        }
    }

    impl Artifact for LoneModel {}

    fn manager() -> GroupManager {
        let mut registry = ArtifactRegistry::with_conventions();
        registry.scan(&[ArtifactClass::of::<LoneModel>()]);
        GroupManager::builder(Arc::new(registry))
            .template(GroupTemplate::new("lone").with_member(RoleType::Model, "LoneModel"))
            .build()
    }

    #[tokio::test]
    async fn test_create_and_destroy_with_default_collaborators() {
        let manager = manager();
        assert!(manager.validate_templates().is_ok());
        assert_eq!(manager.templates().count(), 1);

        let group = manager.create("lone", None, GroupArgs::new()).await.unwrap();
        assert_eq!(group.id(), "lone-1");
        assert_eq!(group.state(), GroupState::Live);
        assert_eq!(group.roles(), vec![RoleType::Model]);

        manager.destroy(group.id()).await.unwrap();
        assert_eq!(group.state(), GroupState::Destroyed);
        assert!(group.members().is_empty());
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_child_of_tearing_down_parent_is_refused() {
        let manager = manager();
        let parent = manager.create("lone", Some("p"), GroupArgs::new()).await.unwrap();
        parent.begin_teardown(GroupState::Destroying);

        let result = manager
            .create_child("p", "lone", Some("c"), GroupArgs::new())
            .await;

        assert!(matches!(result, Err(GroupError::NotFound(ref id)) if id == "p"));
        assert!(manager.table().get("c").is_none());
        assert!(parent.children().is_empty());
    }
}
