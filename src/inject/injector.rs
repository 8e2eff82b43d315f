//! Injection requests, service bindings and the default injector.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::framework::{Artifact, ArtifactClass, GroupArgs, InjectError, RoleType};

/// What the manager tells the injector about the object it needs.
#[derive(Debug, Clone, Copy)]
pub struct InjectionRequest<'a> {
    pub group_id: &'a str,
    pub role: RoleType,
    pub args: &'a GroupArgs,
}

impl<'a> InjectionRequest<'a> {
    pub fn new(group_id: &'a str, role: RoleType, args: &'a GroupArgs) -> Self {
        Self {
            group_id,
            role,
            args,
        }
    }
}

/// Type-keyed shared services.
#[derive(Default, Clone)]
pub struct ServiceBindings {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `service` as the instance of `T`, replacing any earlier binding.
    pub fn bind<T: Any + Send + Sync>(&mut self, service: Arc<T>) -> &mut Self {
        self.services.insert(TypeId::of::<T>(), service);
        self
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// View of the injection environment given to constructors and member injection.
pub struct InjectionContext<'a> {
    request: InjectionRequest<'a>,
    bindings: &'a ServiceBindings,
}

impl<'a> InjectionContext<'a> {
    pub fn new(request: InjectionRequest<'a>, bindings: &'a ServiceBindings) -> Self {
        Self { request, bindings }
    }

    pub fn group_id(&self) -> &str {
        self.request.group_id
    }

    pub fn role(&self) -> RoleType {
        self.request.role
    }

    pub fn args(&self) -> &GroupArgs {
        self.request.args
    }

    /// Optional service lookup.
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.bindings.get::<T>()
    }

    /// Service lookup that fails when `T` is unbound.
    pub fn require<T: Any + Send + Sync>(&self) -> Result<Arc<T>, InjectError> {
        self.service::<T>()
            .ok_or(InjectError::MissingBinding(type_name::<T>()))
    }
}

/// Builds role-objects for the group manager.
pub trait Injector: Send + Sync {
    fn create(
        &self,
        class: &ArtifactClass,
        request: &InjectionRequest<'_>,
    ) -> Result<Arc<dyn Artifact>, InjectError>;

    fn inject_members(
        &self,
        instance: &Arc<dyn Artifact>,
        request: &InjectionRequest<'_>,
    ) -> Result<(), InjectError>;
}

/// Injector backed by the class constructors and a set of service bindings.
#[derive(Default)]
pub struct DefaultInjector {
    bindings: ServiceBindings,
}

impl DefaultInjector {
    pub fn new(bindings: ServiceBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &ServiceBindings {
        &self.bindings
    }
}

impl Injector for DefaultInjector {
    fn create(
        &self,
        class: &ArtifactClass,
        request: &InjectionRequest<'_>,
    ) -> Result<Arc<dyn Artifact>, InjectError> {
        let ctx = InjectionContext::new(*request, &self.bindings);
        debug!(class = class.full_name(), role = %request.role, group_id = request.group_id, "Construct");
        class
            .instantiate(&ctx)
            .map_err(|source| InjectError::Construction {
                class: class.full_name().to_string(),
                source,
            })
    }

    fn inject_members(
        &self,
        instance: &Arc<dyn Artifact>,
        request: &InjectionRequest<'_>,
    ) -> Result<(), InjectError> {
        let ctx = InjectionContext::new(*request, &self.bindings);
        instance.inject(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{downcast_artifact, BoxError, Construct};
    use parking_lot::Mutex;

    struct Clock {
        now: u64,
    }

    struct TimedModel {
        started_at: u64,
        title: Mutex<Option<String>>,
    }

    impl Artifact for TimedModel {
        fn inject(&self, ctx: &InjectionContext<'_>) -> Result<(), InjectError> {
            *self.title.lock() = ctx.args().get("title");
            Ok(())
        }
    }

    impl Construct for TimedModel {
        fn construct(ctx: &InjectionContext<'_>) -> Result<Self, BoxError> {
            let clock = ctx.require::<Clock>()?;
            Ok(Self {
                started_at: clock.now,
                title: Mutex::new(None),
            })
        }
    }

    #[test]
    fn test_service_bindings_replace_and_lookup() {
        let mut bindings = ServiceBindings::new();
        bindings.bind(Arc::new(Clock { now: 1 }));
        bindings.bind(Arc::new(Clock { now: 2 }));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get::<Clock>().unwrap().now, 2);
        assert!(bindings.get::<String>().is_none());
    }

    #[test]
    fn test_default_injector_constructs_and_injects() {
        let mut bindings = ServiceBindings::new();
        bindings.bind(Arc::new(Clock { now: 42 }));
        let injector = DefaultInjector::new(bindings);

        let args = GroupArgs::new().with("title", "Orders");
        let request = InjectionRequest::new("orders-1", RoleType::Model, &args);
        let class = ArtifactClass::of::<TimedModel>();

        let instance = injector.create(&class, &request).unwrap();
        injector.inject_members(&instance, &request).unwrap();

        let model = downcast_artifact::<TimedModel>(&instance).unwrap();
        assert_eq!(model.started_at, 42);
        assert_eq!(model.title.lock().as_deref(), Some("Orders"));
    }

    #[test]
    fn test_missing_binding_is_construction_error() {
        let injector = DefaultInjector::default();
        let args = GroupArgs::new();
        let request = InjectionRequest::new("orders-1", RoleType::Model, &args);

        let err = injector
            .create(&ArtifactClass::of::<TimedModel>(), &request)
            .err()
            .unwrap();
        assert!(matches!(err, InjectError::Construction { .. }));
        assert!(err.to_string().contains("No binding registered"));
    }
}
