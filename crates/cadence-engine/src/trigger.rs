//! State-change subscriptions.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use cadence_core::Value;

use crate::interface::Interface;
use crate::module::{CallResult, Module};

/// A trigger callback: `(interface, new_value, old_value)`.
///
/// `old_value` is `None` the first time a key is set.
pub type TriggerFn = Arc<dyn Fn(&Interface, &Value, Option<&Value>) -> CallResult + Send + Sync>;

/// A callback bound to the module that registered it.
#[derive(Clone)]
pub(crate) struct Trigger {
    pub(crate) owner: Arc<Module>,
    pub(crate) callback: TriggerFn,
}

/// Per-key trigger lists, append-only.
///
/// Rebuilt by module `init` code on every registration; never persisted.
#[derive(Default)]
pub(crate) struct TriggerRegistry {
    by_key: IndexMap<String, SmallVec<[Trigger; 2]>>,
}

impl TriggerRegistry {
    pub(crate) fn add(&mut self, key: impl Into<String>, trigger: Trigger) {
        self.by_key.entry(key.into()).or_default().push(trigger);
    }

    /// Copy of the triggers for `key`, in registration order.
    pub(crate) fn for_key(&self, key: &str) -> SmallVec<[Trigger; 2]> {
        self.by_key.get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.values().map(SmallVec::len).sum()
    }
}
