//! The table of group instances, keyed by id.
//!
//! An entry exists from the moment an id is reserved by `create` until its destroy has
//! fully completed, so an id can never be handed out twice while in use. Only entries
//! in [`GroupState::Live`](crate::lifecycle::GroupState::Live) count as live.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::lifecycle::group::GroupInstance;

#[derive(Default)]
pub struct LiveTable {
    entries: Mutex<HashMap<String, Arc<GroupInstance>>>,
}

impl LiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `instance` unless its id is taken. Returns whether it was inserted.
    pub(crate) fn insert_if_vacant(&self, instance: Arc<GroupInstance>) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(instance.id()) {
            return false;
        }
        entries.insert(instance.id().to_string(), instance);
        true
    }

    /// Removes `instance`, leaving a different instance under the same id untouched.
    pub(crate) fn remove(&self, instance: &Arc<GroupInstance>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(instance.id()) {
            Some(current) if Arc::ptr_eq(current, instance) => {
                entries.remove(instance.id());
                true
            }
            _ => false,
        }
    }

    /// Any entry for `id`, whatever its state.
    pub fn get(&self, id: &str) -> Option<Arc<GroupInstance>> {
        self.entries.lock().get(id).cloned()
    }

    /// The entry for `id` if it is live.
    pub fn get_live(&self, id: &str) -> Option<Arc<GroupInstance>> {
        self.get(id).filter(|g| g.is_live())
    }

    /// Live ids, sorted.
    pub fn live_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .lock()
            .values()
            .filter(|g| g.is_live())
            .map(|g| g.id().to_string())
            .collect();
        ids.sort();
        ids
    }

    pub fn live(&self) -> Vec<Arc<GroupInstance>> {
        self.entries
            .lock()
            .values()
            .filter(|g| g.is_live())
            .cloned()
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().values().filter(|g| g.is_live()).count()
    }

    /// Entries in any state, including reservations and groups mid-teardown.
    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }
}
