use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

use crate::framework::{
    Artifact, BoxError, Construct, HookContext, InjectError, RoleType, Sibling, WiringError,
};
use crate::inject::InjectionContext;
use crate::sample::{Greeter, SampleModel, SampleView};

/// Reacts to user input by updating the model and rendering through the view.
#[derive(Default)]
pub struct SampleController {
    model: Sibling<SampleModel>,
    view: Sibling<SampleView>,
    greeter: RwLock<Option<Arc<Greeter>>>,
}

impl SampleController {
    /// Records a click on the model and renders it. `None` once the group is released.
    pub fn click(&self) -> Option<String> {
        let clicks = self.model.get()?.record_click();
        let view = self.view.get()?;
        Some(view.render(&format!("clicked {clicks} times")))
    }

    /// Greets `name` through the bound [`Greeter`], falling back to a plain greeting.
    pub fn greet(&self, name: &str) -> String {
        match &*self.greeter.read() {
            Some(greeter) => greeter.greet(name),
            None => format!("Hi, {name}"),
        }
    }

    pub fn model(&self) -> Option<Arc<SampleModel>> {
        self.model.get()
    }

    pub fn view(&self) -> Option<Arc<SampleView>> {
        self.view.get()
    }
}

impl Construct for SampleController {
    fn construct(_ctx: &InjectionContext<'_>) -> Result<Self, BoxError> {
        Ok(Self::default())
    }
}

#[async_trait]
impl Artifact for SampleController {
    fn references(&self) -> &[RoleType] {
        &[RoleType::Model, RoleType::View]
    }

    fn wire(&self, role: RoleType, sibling: &Arc<dyn Artifact>) -> Result<(), WiringError> {
        match role {
            RoleType::Model => self.model.bind(role, sibling),
            RoleType::View => self.view.bind(role, sibling),
            _ => Ok(()),
        }
    }

    fn inject(&self, ctx: &InjectionContext<'_>) -> Result<(), InjectError> {
        *self.greeter.write() = ctx.service::<Greeter>();
        Ok(())
    }

    async fn init(&self, ctx: &HookContext) -> Result<(), BoxError> {
        let user = ctx.args().get::<String>("user").unwrap_or_else(|| "world".into());
        let greeting = self.greet(&user);
        if let Some(view) = self.view.get() {
            view.render(&greeting);
        }
        info!(group_id = ctx.group_id(), %greeting, "Controller ready");
        Ok(())
    }

    fn release(&self) {
        self.model.clear();
        self.view.clear();
    }
}
