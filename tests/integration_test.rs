use std::sync::Arc;

use parking_lot::Mutex;

use mvc_lifecycle::config::AppConfig;
use mvc_lifecycle::events::{EventKind, EventRouter};
use mvc_lifecycle::framework::mock::ImmediateExecutor;
use mvc_lifecycle::framework::{ArtifactClass, GroupArgs, RoleType};
use mvc_lifecycle::inject::DefaultInjector;
use mvc_lifecycle::lifecycle::GroupManager;
use mvc_lifecycle::sample::{self, Greeter, SampleController, SampleModel, SampleView};
use mvc_lifecycle::threading::InteractionThread;

fn manager_with(
    config: AppConfig,
    router: Arc<EventRouter>,
    executor: Arc<dyn mvc_lifecycle::threading::InteractionExecutor>,
) -> GroupManager {
    GroupManager::builder(Arc::new(sample::registry()))
        .config(config)
        .injector(Arc::new(DefaultInjector::new(sample::bindings())))
        .publisher(router)
        .executor(executor)
        .build()
}

#[test]
fn test_sample_classes_are_registered_by_convention() {
    let registry = sample::registry();

    let model = registry
        .find_by_class(&ArtifactClass::of::<SampleModel>())
        .expect("model registered");
    assert_eq!(model.role_type(), RoleType::Model);
    assert_eq!(model.logical_name(), "sample");

    let controller = registry.find_by_type::<SampleController>().unwrap();
    assert_eq!(controller.role_type(), RoleType::Controller);
    assert!(registry.find_by_type::<Greeter>().is_none());

    for name in ["app::SampleView", "SampleView", "sample"] {
        let view = registry.find_by_name_and_type(name, RoleType::View).unwrap();
        assert_eq!(view.simple_name(), "SampleView");
    }
    assert_eq!(registry.all_of_type(RoleType::Service).len(), 0);
}

/// Full end-to-end run: config file on disk, real interaction thread, event router.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sample_group_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.yaml");
    std::fs::write(&path, sample::CONFIG).unwrap();
    let config = AppConfig::from_path(&path).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let router = Arc::new(EventRouter::new());
    let sink = seen.clone();
    router.subscribe_all(move |event| {
        sink.lock().push(format!("{}:{}", event.name(), event.group_id()));
    });

    let interaction = Arc::new(InteractionThread::spawn("ui-e2e").unwrap());
    let manager = manager_with(config, router, interaction.clone());
    manager.validate_templates().unwrap();

    let args = GroupArgs::new().with("user", "Alice");
    manager.create("sample", Some("main"), args).await.unwrap();

    let controller = manager
        .find_role_instance::<SampleController>("main", RoleType::Controller)
        .unwrap();
    let view = manager
        .find_role_instance::<SampleView>("main", RoleType::View)
        .unwrap();
    let model = manager
        .find_role_instance::<SampleModel>("main", RoleType::Model)
        .unwrap();

    // The view mounted on the interaction thread, not on the test's worker
    assert_ne!(view.mounted_on(), Some(std::thread::current().id()));
    assert!(view.mounted_on().is_some());

    assert_eq!(controller.click().as_deref(), Some("[Hello] clicked 1 times"));
    model.set_title("Renamed");
    assert_eq!(controller.click().as_deref(), Some("[Renamed] clicked 2 times"));
    assert_eq!(model.clicks(), 2);
    assert_eq!(
        view.lines(),
        vec![
            "[Hello] mounted",
            "[Hello] Hello, Alice!",
            "[Hello] clicked 1 times",
            "[Renamed] clicked 2 times",
        ]
    );

    manager.destroy("main").await.unwrap();

    // Released members no longer reach their siblings
    assert!(controller.click().is_none());
    assert!(controller.model().is_none());
    assert_eq!(
        *seen.lock(),
        vec![
            "GroupCreated:main",
            "GroupDestroying:main",
            "GroupDestroyed:main",
        ]
    );

    interaction.shutdown().unwrap();
}

#[tokio::test]
async fn test_template_args_feed_constructors() {
    let config = AppConfig::from_yaml_str(sample::CONFIG).unwrap();
    let manager = manager_with(config, Arc::new(EventRouter::new()), Arc::new(ImmediateExecutor::new()));

    let status = manager.create("status", None, GroupArgs::new()).await.unwrap();
    assert!(status.id().starts_with("status-"));
    let model = status.member_as::<SampleModel>(RoleType::Model).unwrap();
    assert_eq!(model.title(), "Status");

    let custom = manager
        .create("status", None, GroupArgs::new().with("title", "Custom"))
        .await
        .unwrap();
    let model = custom.member_as::<SampleModel>(RoleType::Model).unwrap();
    assert_eq!(model.title(), "Custom");
}

#[tokio::test]
async fn test_greeter_comes_from_bindings() {
    let config = AppConfig::from_yaml_str(sample::CONFIG).unwrap();
    let executor = Arc::new(ImmediateExecutor::new());
    let manager = manager_with(config, Arc::new(EventRouter::new()), executor.clone());

    let greeting = manager
        .with_group("sample", None, GroupArgs::new(), |group| async move {
            let controller = group
                .member_as::<SampleController>(RoleType::Controller)
                .unwrap();
            Ok::<_, mvc_lifecycle::framework::GroupError>(controller.greet("Bob"))
        })
        .await
        .unwrap();

    assert_eq!(greeting, "Hello, Bob!");
    assert!(manager.is_empty());
    // call_sync short-circuits on an executor that is always on the interaction thread
    assert_eq!(executor.executed(), 0);
}

#[tokio::test]
async fn test_listeners_filter_by_kind_and_can_be_removed() {
    let config = AppConfig::from_yaml_str(sample::CONFIG).unwrap();
    let router = Arc::new(EventRouter::new());
    let created = Arc::new(Mutex::new(Vec::new()));
    let sink = created.clone();
    let id = router.subscribe(EventKind::Created, move |event| {
        sink.lock().push(event.group_id().to_string());
    });
    let manager = manager_with(config, router.clone(), Arc::new(ImmediateExecutor::new()));

    manager.create("status", Some("s1"), GroupArgs::new()).await.unwrap();
    manager.destroy("s1").await.unwrap();
    assert!(router.unsubscribe(id));
    manager.create("status", Some("s2"), GroupArgs::new()).await.unwrap();

    assert_eq!(*created.lock(), vec!["s1".to_string()]);
}
