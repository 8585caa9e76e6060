//! The capability façade handed to module code.
//!
//! [`Interface`] is the only way modules touch shared state and the
//! schedule. Every mutating call checks that a module is executing and
//! attributes the call to it.
//!
//! # Re-entrancy
//!
//! `set` runs triggers synchronously, and triggers may call `set` again.
//! No `RefCell` borrow is held while module code runs, so arbitrary
//! nesting is sound. There is no depth guard: two triggers that keep
//! setting each other's keys recurse until the call stack is exhausted.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::sync::Arc;

use cadence_core::{Clock, FunctionId, RuntimeError, ScheduleItem, ScheduleOptions, Timestamp, Value};

use crate::context::{ContextGuard, ExecutionContextStack};
use crate::module::{CallResult, Module, ModuleFn};
use crate::scheduler::Scheduler;
use crate::state::StateStore;
use crate::trigger::{Trigger, TriggerRegistry};

/// What `schedule` should call.
#[derive(Clone)]
pub enum FunctionRef {
    /// A function name. A bare name is qualified with the calling
    /// module's name; a name containing `.` is taken as a full
    /// `"<module>.<function>"` id. Never checked until the item fires.
    Name(String),
    /// A handle that must be one of the calling module's own functions.
    Handle(ModuleFn),
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl From<&str> for FunctionRef {
    fn from(v: &str) -> Self {
        Self::Name(v.to_string())
    }
}

impl From<String> for FunctionRef {
    fn from(v: String) -> Self {
        Self::Name(v)
    }
}

impl From<ModuleFn> for FunctionRef {
    fn from(v: ModuleFn) -> Self {
        Self::Handle(v)
    }
}

impl From<&ModuleFn> for FunctionRef {
    fn from(v: &ModuleFn) -> Self {
        Self::Handle(Arc::clone(v))
    }
}

/// Module-facing access to state, triggers, and the schedule.
///
/// One per [`Runtime`](crate::Runtime). Read access is unrestricted;
/// `set`, `add_trigger`, and `schedule` fail with
/// [`RuntimeError::Context`] when no module is executing.
pub struct Interface {
    state: RefCell<StateStore>,
    scheduler: RefCell<Scheduler>,
    triggers: RefCell<TriggerRegistry>,
    context: RefCell<ExecutionContextStack>,
    clock: Box<dyn Clock>,
}

impl Interface {
    pub(crate) fn new(scheduler: Scheduler, state: StateStore, clock: Box<dyn Clock>) -> Self {
        Self {
            state: RefCell::new(state),
            scheduler: RefCell::new(scheduler),
            triggers: RefCell::new(TriggerRegistry::default()),
            context: RefCell::new(ExecutionContextStack::new()),
            clock,
        }
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.borrow().get(key).cloned()
    }

    /// Overwrite `key`, then run its triggers in registration order.
    ///
    /// Each trigger receives `(new, old)` and runs under the module that
    /// registered it. The trigger list is fixed when `set` starts, so a
    /// trigger added during dispatch first fires on the next `set`. The
    /// first failing trigger aborts the rest and its error is returned;
    /// the write itself is not undone.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> CallResult {
        self.require_context("set")?;
        let key = key.into();
        let value = value.into();

        let triggers = self.triggers.borrow().for_key(&key);
        if triggers.is_empty() {
            self.state.borrow_mut().set(key, value);
            return Ok(());
        }

        let old = self.state.borrow_mut().set(key, value.clone());
        for trigger in triggers {
            self.invoke_as(&trigger.owner, |iface| {
                (trigger.callback)(iface, &value, old.as_ref())
            })?;
        }
        Ok(())
    }

    /// Subscribe `callback` to every future `set` of `key`.
    ///
    /// The callback is bound to the calling module. There is no removal.
    pub fn add_trigger<F>(&self, key: impl Into<String>, callback: F) -> CallResult
    where
        F: Fn(&Interface, &Value, Option<&Value>) -> CallResult + Send + Sync + 'static,
    {
        let owner = self.require_context("add_trigger")?;
        self.triggers.borrow_mut().add(
            key,
            Trigger {
                owner,
                callback: Arc::new(callback),
            },
        );
        Ok(())
    }

    /// Enqueue one future invocation.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Context`] outside a module;
    /// [`RuntimeError::Resolution`] if a handle is not one of the calling
    /// module's own functions.
    pub fn schedule(&self, target: impl Into<FunctionRef>, options: ScheduleOptions) -> CallResult {
        let module = self.require_context("schedule")?;
        let id = match target.into() {
            FunctionRef::Name(name) if name.contains('.') => FunctionId::from(name),
            FunctionRef::Name(name) => FunctionId::new(module.name(), &name),
            FunctionRef::Handle(handle) => {
                let name = module
                    .resolve_handle(&handle)
                    .ok_or_else(|| RuntimeError::Resolution {
                        module: module.name().to_string(),
                    })?;
                FunctionId::new(module.name(), name)
            }
        };

        let item = ScheduleItem::new(id, options, self.clock.now());
        tracing::debug!(
            id = %item.id,
            when = %item.when,
            priority = item.priority,
            "scheduled"
        );
        self.scheduler.borrow_mut().insert(item);
        Ok(())
    }

    /// The runtime's current time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Name of the module currently executing.
    pub fn current_module(&self) -> Option<String> {
        self.context
            .borrow()
            .current()
            .map(|m| m.name().to_string())
    }

    /// Run `f` with `module` pushed as the executing context.
    pub(crate) fn invoke_as<R>(&self, module: &Arc<Module>, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = ContextGuard::enter(&self.context, Arc::clone(module));
        f(self)
    }

    pub(crate) fn state(&self) -> Ref<'_, StateStore> {
        self.state.borrow()
    }

    pub(crate) fn scheduler(&self) -> Ref<'_, Scheduler> {
        self.scheduler.borrow()
    }

    pub(crate) fn scheduler_mut(&self) -> RefMut<'_, Scheduler> {
        self.scheduler.borrow_mut()
    }

    pub(crate) fn trigger_count(&self) -> usize {
        self.triggers.borrow().len()
    }

    pub(crate) fn context_depth(&self) -> usize {
        self.context.borrow().depth()
    }

    fn require_context(&self, operation: &'static str) -> Result<Arc<Module>, RuntimeError> {
        self.context
            .borrow()
            .current()
            .cloned()
            .ok_or(RuntimeError::Context { operation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::ManualClock;
    use serde_json::json;
    use std::sync::Mutex;

    fn interface() -> Interface {
        Interface::new(
            Scheduler::new(),
            StateStore::new(),
            Box::new(ManualClock::new(Timestamp(1_000))),
        )
    }

    fn module(name: &str) -> Arc<Module> {
        Arc::new(Module::new(name))
    }

    #[test]
    fn get_needs_no_context() {
        let iface = interface();
        assert_eq!(iface.get("h"), None);
    }

    #[test]
    fn mutation_outside_module_is_context_error() {
        let iface = interface();
        assert_eq!(
            iface.set("h", 1),
            Err(RuntimeError::Context { operation: "set" })
        );
        assert_eq!(
            iface.schedule("f", ScheduleOptions::new()),
            Err(RuntimeError::Context { operation: "schedule" })
        );
        assert_eq!(
            iface.add_trigger("h", |_, _, _| Ok(())),
            Err(RuntimeError::Context { operation: "add_trigger" })
        );
        assert!(iface.state().is_empty());
        assert_eq!(iface.scheduler().len(), 0);
    }

    #[test]
    fn set_inside_module_writes() {
        let iface = interface();
        iface
            .invoke_as(&module("m"), |i| i.set("h", 25))
            .unwrap();
        assert_eq!(iface.get("h"), Some(json!(25)));
        assert_eq!(iface.context_depth(), 0);
    }

    #[test]
    fn triggers_run_in_order_with_new_and_old() {
        let iface = interface();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let m = module("m");
        iface
            .invoke_as(&m, |i| {
                i.set("k", "old")?;
                let s1 = Arc::clone(&seen);
                i.add_trigger("k", move |_, new, old| {
                    s1.lock().unwrap().push(("cb1", new.clone(), old.cloned()));
                    Ok(())
                })?;
                let s2 = Arc::clone(&seen);
                i.add_trigger("k", move |_, new, old| {
                    s2.lock().unwrap().push(("cb2", new.clone(), old.cloned()));
                    Ok(())
                })
            })
            .unwrap();
        iface.invoke_as(&m, |i| i.set("k", "new")).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("cb1", json!("new"), Some(json!("old"))),
                ("cb2", json!("new"), Some(json!("old"))),
            ]
        );
        assert_eq!(iface.trigger_count(), 2);
    }

    #[test]
    fn first_set_passes_no_old_value() {
        let iface = interface();
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        iface
            .invoke_as(&module("m"), |i| {
                i.add_trigger("fresh", move |_, _, old| {
                    *s.lock().unwrap() = Some(old.is_none());
                    Ok(())
                })?;
                i.set("fresh", true)
            })
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }

    #[test]
    fn trigger_runs_under_registering_module() {
        let iface = interface();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        iface
            .invoke_as(&module("listener"), |i| {
                i.add_trigger("k", move |i, _, _| {
                    s.lock().unwrap().push(i.current_module());
                    Ok(())
                })
            })
            .unwrap();
        iface.invoke_as(&module("writer"), |i| i.set("k", 1)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![Some("listener".to_string())]);
    }

    #[test]
    fn failing_trigger_aborts_rest_but_keeps_write() {
        let iface = interface();
        let ran = Arc::new(Mutex::new(false));
        let r = Arc::clone(&ran);
        iface
            .invoke_as(&module("m"), |i| {
                i.add_trigger("k", |_, _, _| Err(RuntimeError::callback("boom")))?;
                i.add_trigger("k", move |_, _, _| {
                    *r.lock().unwrap() = true;
                    Ok(())
                })
            })
            .unwrap();
        let result = iface.invoke_as(&module("m"), |i| i.set("k", 7));
        assert_eq!(result, Err(RuntimeError::callback("boom")));
        assert!(!*ran.lock().unwrap());
        assert_eq!(iface.get("k"), Some(json!(7)));
        assert_eq!(iface.context_depth(), 0);
    }

    #[test]
    fn nested_set_from_trigger_fires_chain() {
        let iface = interface();
        iface
            .invoke_as(&module("m"), |i| {
                i.add_trigger("a", |i, new, _| i.set("b", new.clone()))?;
                i.add_trigger("b", |i, new, _| i.set("c", new.clone()))
            })
            .unwrap();
        iface.invoke_as(&module("m"), |i| i.set("a", 3)).unwrap();
        assert_eq!(iface.get("c"), Some(json!(3)));
    }

    #[test]
    fn schedule_by_name_qualifies_with_current_module() {
        let iface = interface();
        iface
            .invoke_as(&module("m"), |i| {
                i.schedule("later", ScheduleOptions::new().delay(5))?;
                i.schedule("other.fn", ScheduleOptions::new())
            })
            .unwrap();
        let ids: Vec<String> = iface
            .scheduler()
            .export()
            .iter()
            .map(|item| item.id.to_string())
            .collect();
        assert_eq!(ids, vec!["other.fn", "m.later"]);
        assert_eq!(iface.scheduler().next_due(), Some(Timestamp(1_000)));
    }

    #[test]
    fn schedule_by_foreign_handle_is_resolution_error() {
        let iface = interface();
        let foreign = crate::module::function(|_, _| Ok(()));
        let result = iface.invoke_as(&module("m"), |i| i.schedule(&foreign, ScheduleOptions::new()));
        assert_eq!(
            result,
            Err(RuntimeError::Resolution {
                module: "m".to_string()
            })
        );
        assert_eq!(iface.scheduler().len(), 0);
    }

    #[test]
    fn schedule_by_own_handle_resolves_name() {
        let iface = interface();
        let bump = crate::module::function(|_, _| Ok(()));
        let m = Arc::new(Module::new("m").with_handle("bump", bump.clone()));
        iface
            .invoke_as(&m, |i| i.schedule(bump.clone(), ScheduleOptions::new().priority(4)))
            .unwrap();
        let items = iface.scheduler().export();
        assert_eq!(items[0].id.as_str(), "m.bump");
        assert_eq!(items[0].priority, 4.0);
    }
}
