use std::sync::Arc;
use std::thread::{self, ThreadId};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::framework::{Artifact, BoxError, Construct, HookContext, RoleType, Sibling, WiringError};
use crate::inject::InjectionContext;
use crate::sample::SampleModel;
use crate::threading::call_sync;

/// Renders the model's title into an in-memory transcript.
#[derive(Default)]
pub struct SampleView {
    model: Sibling<SampleModel>,
    lines: Mutex<Vec<String>>,
    mounted_on: Mutex<Option<ThreadId>>,
}

impl SampleView {
    /// Appends `text`, prefixed by the model's title, and returns the rendered line.
    pub fn render(&self, text: &str) -> String {
        let title = self.model.get().map(|m| m.title()).unwrap_or_default();
        let line = format!("[{title}] {text}");
        self.lines.lock().push(line.clone());
        line
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// The thread the view was mounted on, once `init` ran.
    pub fn mounted_on(&self) -> Option<ThreadId> {
        *self.mounted_on.lock()
    }

    pub fn model(&self) -> Option<Arc<SampleModel>> {
        self.model.get()
    }
}

impl Construct for SampleView {
    fn construct(_ctx: &InjectionContext<'_>) -> Result<Self, BoxError> {
        Ok(Self::default())
    }
}

#[async_trait]
impl Artifact for SampleView {
    fn references(&self) -> &[RoleType] {
        &[RoleType::Model]
    }

    fn wire(&self, role: RoleType, sibling: &Arc<dyn Artifact>) -> Result<(), WiringError> {
        match role {
            RoleType::Model => self.model.bind(role, sibling),
            _ => Ok(()),
        }
    }

    async fn init(&self, ctx: &HookContext) -> Result<(), BoxError> {
        let thread = call_sync(ctx.executor().as_ref(), || thread::current().id()).await?;
        *self.mounted_on.lock() = Some(thread);
        self.render("mounted");
        debug!(group_id = ctx.group_id(), "View mounted");
        Ok(())
    }

    async fn destroy(&self, _ctx: &HookContext) -> Result<(), BoxError> {
        self.render("unmounted");
        Ok(())
    }

    fn release(&self) {
        self.model.clear();
    }
}
