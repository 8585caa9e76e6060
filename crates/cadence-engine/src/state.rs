//! Keyed value store shared by all modules.

use indexmap::IndexMap;

use cadence_core::Value;

/// Mapping from string key to an opaque [`Value`].
///
/// Values are overwritten, never removed. Keys keep their first-insertion
/// order, so [`export`](StateStore::export) is deterministic for a given
/// sequence of writes.
///
/// The store performs no authorization; only the
/// [`Interface`](crate::Interface) writes to it, and only under a module
/// context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateStore {
    data: IndexMap<String, Value>,
}

impl StateStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a previously exported mapping. No shape checks.
    pub fn from_map(data: IndexMap<String, Value>) -> Self {
        Self { data }
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Overwrite `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    /// Whether `key` has ever been set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no key has been set.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The full current mapping, for snapshots.
    pub fn export(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// Consume the store, yielding its mapping.
    pub fn into_map(self) -> IndexMap<String, Value> {
        self.data
    }
}
