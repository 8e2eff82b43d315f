use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::framework::{Artifact, BoxError, Construct, HookContext};
use crate::inject::InjectionContext;

const DEFAULT_TITLE: &str = "Untitled";

/// State of the sample group.
#[derive(Debug)]
pub struct SampleModel {
    title: RwLock<String>,
    clicks: AtomicU64,
}

impl SampleModel {
    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Counts a click and returns the new total.
    pub fn record_click(&self) -> u64 {
        self.clicks.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Construct for SampleModel {
    fn construct(ctx: &InjectionContext<'_>) -> Result<Self, BoxError> {
        let title = ctx
            .args()
            .get::<String>("title")
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Ok(Self {
            title: RwLock::new(title),
            clicks: AtomicU64::new(0),
        })
    }
}

#[async_trait]
impl Artifact for SampleModel {
    async fn init(&self, ctx: &HookContext) -> Result<(), BoxError> {
        debug!(group_id = ctx.group_id(), title = %self.title(), "Model ready");
        Ok(())
    }
}
