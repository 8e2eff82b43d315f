//! Key/value arguments handed to a group at creation time.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arbitrary creation arguments of a group.
///
/// Values are JSON values so that template defaults loaded from configuration and
/// arguments supplied in code share one representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupArgs(BTreeMap<String, Value>);

impl GroupArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Typed read. `None` if the key is missing or holds a different shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns `self` overlaid with `overrides`; keys in `overrides` win.
    pub fn merged(&self, overrides: &GroupArgs) -> GroupArgs {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        GroupArgs(merged)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for GroupArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        GroupArgs(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        let args = GroupArgs::new().with("title", "Hello").with("count", 3);
        assert_eq!(args.get::<String>("title").as_deref(), Some("Hello"));
        assert_eq!(args.get::<u32>("count"), Some(3));
        assert_eq!(args.get::<u32>("title"), None);
        assert_eq!(args.get::<u32>("missing"), None);
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let defaults = GroupArgs::new().with("title", "Default").with("width", 640);
        let caller = GroupArgs::from_iter([("title", "Custom")]);

        let merged = defaults.merged(&caller);
        assert_eq!(merged.get::<String>("title").as_deref(), Some("Custom"));
        assert_eq!(merged.get::<i64>("width"), Some(640));
        assert_eq!(merged.len(), 2);
    }
}
