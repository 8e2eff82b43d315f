//! # MVC Lifecycle Demo
//!
//! Builds the sample registry, loads the sample templates and walks one group through
//! its whole lifecycle:
//!
//! 1. Create a `sample` group with a child `status` group.
//! 2. Drive the controller and read the view's transcript.
//! 3. Run a scoped group through `with_group`.
//! 4. Shut everything down.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mvc_lifecycle::config::AppConfig;
use mvc_lifecycle::events::{EventKind, EventRouter};
use mvc_lifecycle::framework::{BoxError, GroupArgs, RoleType};
use mvc_lifecycle::inject::DefaultInjector;
use mvc_lifecycle::lifecycle::{setup_tracing, GroupManager};
use mvc_lifecycle::sample::{self, SampleController, SampleView};
use mvc_lifecycle::threading::InteractionThread;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting group lifecycle demo");

    let config = AppConfig::from_yaml_str(sample::CONFIG).map_err(|e| e.to_string())?;
    let interaction = Arc::new(InteractionThread::spawn("interaction").map_err(|e| e.to_string())?);
    let router = Arc::new(EventRouter::new());
    router.subscribe_all(|event| info!(event = event.name(), group_id = event.group_id(), "Event"));

    let manager = GroupManager::builder(Arc::new(sample::registry()))
        .config(config)
        .injector(Arc::new(DefaultInjector::new(sample::bindings())))
        .publisher(router.clone())
        .executor(interaction.clone())
        .build();
    manager.validate_templates().map_err(|e| e.to_string())?;

    let span = tracing::info_span!("main_group");
    async {
        let args = GroupArgs::new().with("user", "Alice");
        manager
            .create("sample", Some("main"), args)
            .await
            .map_err(|e| e.to_string())?;
        manager
            .create_child("main", "status", None, GroupArgs::new())
            .await
            .map_err(|e| e.to_string())?;

        let controller = manager
            .find_role_instance::<SampleController>("main", RoleType::Controller)
            .ok_or("controller missing")?;
        controller.click();
        controller.click();

        let view = manager
            .find_role_instance::<SampleView>("main", RoleType::View)
            .ok_or("view missing")?;
        for line in view.lines() {
            info!(%line, "Transcript");
        }
        info!(live = ?manager.live_ids(), "Groups live");
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("scoped_group");
    let clicks = manager
        .with_group("sample", None, GroupArgs::new().with("title", "Scoped"), |group| async move {
            let controller = group
                .member_as::<SampleController>(RoleType::Controller)
                .ok_or("controller missing")?;
            controller.click();
            Ok::<_, BoxError>(controller.model().map(|m| m.clicks()).unwrap_or_default())
        })
        .instrument(span)
        .await
        .map_err(|e| e.to_string())?;
    info!(clicks, "Scoped group done");

    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = destroyed.clone();
    router.subscribe(EventKind::Destroyed, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    if let Err(errors) = manager.shutdown().await {
        for e in &errors {
            error!(error = %e, "Shutdown failure");
        }
    }
    info!(
        destroyed = destroyed.load(Ordering::SeqCst),
        "Groups shut down"
    );

    interaction.shutdown().map_err(|e| e.to_string())?;
    info!("Application completed successfully");
    Ok(())
}
