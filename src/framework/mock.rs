//! # Mock Framework
//!
//! Test doubles for asserting lifecycle behavior without wiring real listeners.
//!
//! [`EventRecorder`] implements [`EventPublisher`] and keeps every published event.
//! Plug it into a [`GroupManager`](crate::lifecycle::GroupManager) and inspect what
//! happened afterwards:
//!
//! ```rust,ignore
//! let recorder = Arc::new(EventRecorder::new());
//! let manager = GroupManager::builder(registry)
//!     .publisher(recorder.clone())
//!     .build();
//!
//! manager.create("sample", Some("g1"), GroupArgs::new()).await?;
//! manager.destroy("g1").await?;
//!
//! assert_eq!(
//!     recorder.kinds_for("g1"),
//!     vec![EventKind::Created, EventKind::Destroying, EventKind::Destroyed]
//! );
//! ```
//!
//! [`ImmediateExecutor`] runs interaction tasks inline and counts them.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::events::{EventKind, EventPublisher, GroupEvent};
use crate::framework::RoleType;
use crate::threading::{ExecutorError, InteractionExecutor, Task};

/// What the recorder keeps of each event. Members are reduced to their roles so the
/// recorder never extends a member's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: EventKind,
    pub template: String,
    pub group_id: String,
    pub roles: Vec<RoleType>,
}

/// An [`EventPublisher`] that records every event in publication order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RecordedEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Event kinds seen for one group id, in order.
    pub fn kinds_for(&self, group_id: &str) -> Vec<EventKind> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.group_id == group_id)
            .map(|e| e.kind)
            .collect()
    }

    /// Group ids in the order their `kind` events were published.
    pub fn ids_for(&self, kind: EventKind) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.group_id.clone())
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for EventRecorder {
    fn publish(&self, event: &GroupEvent) {
        let recorded = RecordedEvent {
            kind: event.kind(),
            template: event.template().to_string(),
            group_id: event.group_id().to_string(),
            roles: event.members().iter().map(|(role, _)| *role).collect(),
        };
        self.events.lock().push(recorded);
    }
}

/// Executor that runs every task immediately on the calling thread.
#[derive(Debug, Default)]
pub struct ImmediateExecutor {
    executed: AtomicUsize,
}

impl ImmediateExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks run so far, panicked ones included.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }
}

impl InteractionExecutor for ImmediateExecutor {
    fn is_interaction_thread(&self) -> bool {
        true
    }

    fn run_async(&self, task: Task) -> Result<(), ExecutorError> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        catch_unwind(AssertUnwindSafe(task)).map_err(|_| ExecutorError::TaskPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threading::call_sync;

    #[tokio::test]
    async fn test_immediate_executor_counts_tasks() {
        let executor = ImmediateExecutor::new();
        executor.run_async(Box::new(|| {})).unwrap();
        executor.run_sync(Box::new(|| {})).await.unwrap();
        let value = call_sync(&executor, || 7).await.unwrap();

        assert_eq!(value, 7);
        // run_sync and call_sync short-circuit on the interaction thread
        assert_eq!(executor.executed(), 1);
    }

    #[test]
    fn test_recorder_keeps_order() {
        let recorder = EventRecorder::new();
        recorder.publish(&GroupEvent::Created {
            template: "sample".into(),
            group_id: "g1".into(),
            members: Vec::new(),
        });
        recorder.publish(&GroupEvent::Destroyed {
            template: "sample".into(),
            group_id: "g2".into(),
        });
        recorder.publish(&GroupEvent::Destroyed {
            template: "sample".into(),
            group_id: "g1".into(),
        });

        assert_eq!(recorder.len(), 3);
        assert_eq!(
            recorder.kinds_for("g1"),
            vec![EventKind::Created, EventKind::Destroyed]
        );
        assert_eq!(recorder.ids_for(EventKind::Destroyed), vec!["g2", "g1"]);
        assert_eq!(recorder.count(EventKind::Destroying), 0);

        recorder.clear();
        assert!(recorder.is_empty());
    }
}
