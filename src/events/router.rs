//! Event types, the publisher trait and the in-process router.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::framework::{Artifact, RoleType};

/// Members of a group as carried by events, in role order.
pub type Members = Vec<(RoleType, Arc<dyn Artifact>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Destroying,
    Destroyed,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "GroupCreated",
            Self::Destroying => "GroupDestroying",
            Self::Destroyed => "GroupDestroyed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A group lifecycle notification.
#[derive(Clone)]
pub enum GroupEvent {
    /// The group is live and fully initialized.
    Created {
        template: String,
        group_id: String,
        members: Members,
    },
    /// Teardown is starting; members are still wired.
    Destroying {
        template: String,
        group_id: String,
        members: Members,
    },
    /// Teardown finished; members have been released.
    Destroyed { template: String, group_id: String },
}

impl GroupEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Destroying { .. } => EventKind::Destroying,
            Self::Destroyed { .. } => EventKind::Destroyed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn template(&self) -> &str {
        match self {
            Self::Created { template, .. }
            | Self::Destroying { template, .. }
            | Self::Destroyed { template, .. } => template,
        }
    }

    pub fn group_id(&self) -> &str {
        match self {
            Self::Created { group_id, .. }
            | Self::Destroying { group_id, .. }
            | Self::Destroyed { group_id, .. } => group_id,
        }
    }

    /// Members carried by the event; empty for `Destroyed`.
    pub fn members(&self) -> &[(RoleType, Arc<dyn Artifact>)] {
        match self {
            Self::Created { members, .. } | Self::Destroying { members, .. } => members.as_slice(),
            Self::Destroyed { .. } => &[],
        }
    }
}

impl fmt::Debug for GroupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<RoleType> = self.members().iter().map(|(role, _)| *role).collect();
        f.debug_struct(self.name())
            .field("template", &self.template())
            .field("group_id", &self.group_id())
            .field("members", &roles)
            .finish()
    }
}

/// Sink for lifecycle events.
///
/// Delivery is synchronous within the calling thread.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &GroupEvent);
}

pub type Listener = Arc<dyn Fn(&GroupEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    filter: Option<EventKind>,
    listener: Listener,
}

/// Synchronous event router with per-kind subscriptions.
pub struct EventRouter {
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
    enabled: AtomicBool,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            enabled: AtomicBool::new(true),
        }
    }
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listens to one kind of event.
    pub fn subscribe(
        &self,
        kind: EventKind,
        listener: impl Fn(&GroupEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.add(Some(kind), Arc::new(listener))
    }

    /// Listens to every event.
    pub fn subscribe_all(&self, listener: impl Fn(&GroupEvent) + Send + Sync + 'static) -> ListenerId {
        self.add(None, Arc::new(listener))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// While disabled, published events are dropped.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Publishes on a Tokio task instead of the calling thread.
    pub fn publish_async(self: &Arc<Self>, event: GroupEvent) -> tokio::task::JoinHandle<()> {
        let router = Arc::clone(self);
        tokio::spawn(async move { router.publish(&event) })
    }

    fn add(&self, filter: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            listener,
        });
        debug!(?id, ?filter, "Listener subscribed");
        id
    }
}

impl EventPublisher for EventRouter {
    fn publish(&self, event: &GroupEvent) {
        if !self.is_enabled() {
            trace!(event = event.name(), "Event publishing disabled");
            return;
        }
        // Snapshot so listeners may (un)subscribe while being notified.
        let listeners: Vec<Listener> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.map_or(true, |kind| kind == event.kind()))
            .map(|s| Arc::clone(&s.listener))
            .collect();
        trace!(event = event.name(), group_id = event.group_id(), listeners = listeners.len(), "Publish");
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn destroyed(id: &str) -> GroupEvent {
        GroupEvent::Destroyed {
            template: "sample".into(),
            group_id: id.into(),
        }
    }

    #[test]
    fn test_subscribe_filters_by_kind() {
        let router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        router.subscribe(EventKind::Destroyed, move |e| sink.lock().push(e.group_id().to_string()));
        let sink = seen.clone();
        router.subscribe(EventKind::Created, move |_| sink.lock().push("created".to_string()));

        router.publish(&destroyed("g1"));
        assert_eq!(*seen.lock(), vec!["g1".to_string()]);
    }

    #[test]
    fn test_unsubscribe_and_disable() {
        let router = EventRouter::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let id = router.subscribe_all(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        router.set_enabled(false);
        router.publish(&destroyed("g1"));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        router.set_enabled(true);
        router.publish(&destroyed("g1"));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(router.unsubscribe(id));
        assert!(!router.unsubscribe(id));
        router.publish(&destroyed("g1"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_subscribe_during_dispatch() {
        let router = Arc::new(EventRouter::new());
        let inner = router.clone();
        router.subscribe_all(move |_| {
            inner.subscribe_all(|_| {});
        });
        router.publish(&destroyed("g1"));
        assert_eq!(router.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_publish_async() {
        let router = Arc::new(EventRouter::new());
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        router.subscribe_all(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        router.publish_async(destroyed("g1")).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
