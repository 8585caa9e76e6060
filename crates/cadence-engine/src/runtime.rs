//! The runtime: module registry plus single-step dispatch.
//!
//! [`Runtime`] is the host-facing API. Setup registers modules (running
//! each `init` under its own context); the run phase calls
//! [`tick()`](Runtime::tick) on whatever cadence the host chooses, each
//! call executing at most one scheduled function.
//!
//! # Ownership model
//!
//! `Runtime` is [`Send`] (a host may move it onto a timer thread) but not
//! [`Sync`]: the interface keeps its stores in `RefCell`s, and `tick()`
//! takes `&mut self`, so concurrent dispatch is rejected at compile time.

use std::cell::Ref;
use std::sync::Arc;

use indexmap::IndexMap;

use cadence_core::{Clock, RuntimeError, SystemClock, Timestamp};

use crate::config::{ConfigError, RuntimeConfig};
use crate::interface::Interface;
use crate::metrics::RuntimeMetrics;
use crate::module::Module;
use crate::scheduler::Scheduler;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::StateStore;

// Compile-time assertion: Runtime is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Runtime>();
    }
};

/// Why a dequeued item could not be dispatched.
enum Unresolved {
    Module,
    Function,
}

/// Orchestrates modules, state, and the schedule.
///
/// # Example
///
/// ```
/// use cadence_engine::{Module, Runtime, RuntimeConfig, ScheduleOptions};
/// use cadence_core::{ManualClock, Timestamp};
///
/// let clock = ManualClock::new(Timestamp(0));
/// let mut runtime = Runtime::with_config(RuntimeConfig::default().with_clock(clock.clone()))?;
/// runtime.register_module(
///     Module::new("mymod")
///         .with_init(|iface| iface.schedule("bump", ScheduleOptions::new().delay(10)))
///         .with_function("bump", |iface, _| iface.set("h", 100)),
/// )?;
///
/// assert!(!runtime.tick()?);
/// clock.advance(10);
/// assert!(runtime.tick()?);
/// assert_eq!(runtime.interface().get("h"), Some(cadence_core::Value::from(100)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Runtime {
    interface: Interface,
    modules: IndexMap<String, Arc<Module>>,
    metrics: RuntimeMetrics,
}

impl Runtime {
    /// Build a runtime over `scheduler` and `state`, using the wall clock.
    ///
    /// The stores are taken as-is, without validation; use
    /// [`with_config`](Runtime::with_config) to validate seeded items.
    pub fn new(scheduler: Scheduler, state: StateStore) -> Self {
        Self::from_parts(scheduler, state, Box::new(SystemClock))
    }

    /// Build a runtime from a validated [`RuntimeConfig`].
    pub fn with_config(config: RuntimeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let RuntimeConfig {
            clock,
            scheduler,
            state,
        } = config;
        Ok(Self::from_parts(scheduler, state, clock))
    }

    /// Restore from snapshot text, using the wall clock.
    ///
    /// The module and trigger registries start empty.
    pub fn from_snapshot(text: &str) -> Result<Self, SnapshotError> {
        Self::from_snapshot_with_clock(text, SystemClock)
    }

    /// Restore from snapshot text with an explicit clock.
    pub fn from_snapshot_with_clock(
        text: &str,
        clock: impl Clock + 'static,
    ) -> Result<Self, SnapshotError> {
        let snapshot = Snapshot::from_json(text)?;
        let config = RuntimeConfig {
            clock: Box::new(clock),
            scheduler: Scheduler::from_items(snapshot.schedule),
            state: StateStore::from_map(snapshot.state),
        };
        Ok(Self::with_config(config)?)
    }

    fn from_parts(scheduler: Scheduler, state: StateStore, clock: Box<dyn Clock>) -> Self {
        Self {
            interface: Interface::new(scheduler, state, clock),
            modules: IndexMap::new(),
            metrics: RuntimeMetrics::default(),
        }
    }

    /// Register `module` and run its `init`, if any.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Validation`] for an empty or dotted name,
    /// [`RuntimeError::Duplicate`] if the name is taken, or whatever
    /// `init` returns. A module whose `init` fails stays registered.
    pub fn register_module(&mut self, module: Module) -> Result<(), RuntimeError> {
        module.validate()?;
        if self.modules.contains_key(module.name()) {
            return Err(RuntimeError::Duplicate {
                name: module.name().to_string(),
            });
        }

        let module = Arc::new(module);
        self.modules
            .insert(module.name().to_string(), Arc::clone(&module));
        tracing::debug!(module = module.name(), "module registered");

        match module.init() {
            Some(init) => self.interface.invoke_as(&module, |iface| init(iface)),
            None => {
                tracing::warn!(module = module.name(), "module has no init");
                Ok(())
            }
        }
    }

    /// Execute at most one ready scheduled function.
    ///
    /// Returns `Ok(false)` when nothing is ready. Items naming an unknown
    /// module or function are dropped with a warning and the next ready
    /// item is tried, so a single call either runs exactly one valid
    /// function or finds nothing to run. An error from the function is
    /// returned after its context is popped; the item is consumed either
    /// way.
    pub fn tick(&mut self) -> Result<bool, RuntimeError> {
        let now = self.interface.now();
        loop {
            let Some(item) = self.interface.scheduler_mut().next_ready(now) else {
                self.metrics.idle_ticks += 1;
                return Ok(false);
            };

            let resolved = match item.id.split() {
                None => Err(Unresolved::Module),
                Some((module_name, function_name)) => match self.modules.get(module_name) {
                    None => Err(Unresolved::Module),
                    Some(module) => module
                        .function(function_name)
                        .map(|function| (Arc::clone(module), Arc::clone(function)))
                        .ok_or(Unresolved::Function),
                },
            };

            let (module, function) = match resolved {
                Ok(pair) => pair,
                Err(Unresolved::Module) => {
                    tracing::warn!(id = %item.id, "skipping scheduled call: unknown module");
                    self.metrics.skipped_unknown_module += 1;
                    continue;
                }
                Err(Unresolved::Function) => {
                    tracing::warn!(id = %item.id, "skipping scheduled call: unknown function");
                    self.metrics.skipped_unknown_function += 1;
                    continue;
                }
            };

            tracing::debug!(id = %item.id, %now, "dispatching");
            self.metrics.ticks_executed += 1;
            let result = self
                .interface
                .invoke_as(&module, |iface| function(iface, item.data.as_ref()));
            debug_assert_eq!(self.interface.context_depth(), 0);
            return result.map(|()| true);
        }
    }

    /// Typed snapshot of the live schedule and state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            schedule: self.interface.scheduler().export(),
            state: self.interface.state().export().clone(),
        }
    }

    /// Snapshot encoded as JSON text.
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        self.snapshot().to_json()
    }

    /// The module-facing interface.
    ///
    /// Hosts may read through it; mutating calls fail outside a module.
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Read access to the schedule.
    pub fn scheduler(&self) -> Ref<'_, Scheduler> {
        self.interface.scheduler()
    }

    /// Read access to the state store.
    pub fn state(&self) -> Ref<'_, StateStore> {
        self.interface.state()
    }

    /// The runtime clock's current time.
    pub fn now(&self) -> Timestamp {
        self.interface.now()
    }

    /// Whether a module named `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered module names, in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Current counters.
    pub fn metrics(&self) -> RuntimeMetrics {
        let stats = self.interface.scheduler().stats();
        RuntimeMetrics {
            items_scheduled: stats.scheduled,
            items_expired: stats.expired,
            pending_items: self.interface.scheduler().pending_len(),
            modules: self.modules.len(),
            triggers: self.interface.trigger_count(),
            ..self.metrics.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{FunctionId, ManualClock, ScheduleItem, ScheduleOptions};
    use serde_json::json;
    use std::sync::Mutex;

    fn runtime_at(t: u64) -> (Runtime, ManualClock) {
        let clock = ManualClock::new(Timestamp(t));
        let runtime = Runtime::with_config(RuntimeConfig::default().with_clock(clock.clone()))
            .unwrap();
        (runtime, clock)
    }

    #[test]
    fn register_without_init_is_valid() {
        let (mut rt, _) = runtime_at(0);
        rt.register_module(Module::new("plain")).unwrap();
        assert!(rt.is_registered("plain"));
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn warnings_during(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn missing_init_logs_warning() {
        let (mut rt, _) = runtime_at(0);
        let output = warnings_during(|| rt.register_module(Module::new("plain")).unwrap());
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("module has no init"), "{output}");
        assert!(output.contains("plain"), "{output}");

        let quiet = warnings_during(|| {
            rt.register_module(Module::new("busy").with_init(|_| Ok(())))
                .unwrap()
        });
        assert!(quiet.is_empty(), "{quiet}");
    }

    #[test]
    fn duplicate_registration_rejected() {
        let (mut rt, _) = runtime_at(0);
        rt.register_module(Module::new("m")).unwrap();
        assert_eq!(
            rt.register_module(Module::new("m")),
            Err(RuntimeError::Duplicate {
                name: "m".to_string()
            })
        );
        assert_eq!(rt.module_names().count(), 1);
    }

    #[test]
    fn invalid_name_rejected_and_not_stored() {
        let (mut rt, _) = runtime_at(0);
        assert!(matches!(
            rt.register_module(Module::new("")),
            Err(RuntimeError::Validation { .. })
        ));
        assert_eq!(rt.module_names().count(), 0);
    }

    #[test]
    fn init_runs_under_module_context() {
        let (mut rt, _) = runtime_at(0);
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        rt.register_module(Module::new("m").with_init(move |iface| {
            *s.lock().unwrap() = iface.current_module();
            Ok(())
        }))
        .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some("m".to_string()));
        assert_eq!(rt.interface().current_module(), None);
    }

    #[test]
    fn failing_init_propagates_and_keeps_module() {
        let (mut rt, _) = runtime_at(0);
        let result = rt.register_module(
            Module::new("m").with_init(|_| Err(RuntimeError::callback("no"))),
        );
        assert_eq!(result, Err(RuntimeError::callback("no")));
        assert!(rt.is_registered("m"));
    }

    #[test]
    fn tick_on_empty_schedule_is_false() {
        let (mut rt, _) = runtime_at(0);
        assert_eq!(rt.tick(), Ok(false));
        assert_eq!(rt.metrics().idle_ticks, 1);
    }

    #[test]
    fn tick_passes_data() {
        let (mut rt, _) = runtime_at(0);
        rt.register_module(
            Module::new("m")
                .with_init(|iface| {
                    iface.schedule("store", ScheduleOptions::new().data(json!({"n": 3})))
                })
                .with_function("store", |iface, data| {
                    iface.set("got", data.cloned().unwrap_or_default())
                }),
        )
        .unwrap();
        assert_eq!(rt.tick(), Ok(true));
        assert_eq!(rt.interface().get("got"), Some(json!({"n": 3})));
    }

    #[test]
    fn tick_skips_stale_entries_in_one_call() {
        let items = vec![
            ScheduleItem::new(FunctionId::from("gone.f"), ScheduleOptions::new().priority(9), Timestamp(0)),
            ScheduleItem::new(FunctionId::from("m.missing"), ScheduleOptions::new().priority(8), Timestamp(0)),
            ScheduleItem::new(FunctionId::from("nodot"), ScheduleOptions::new().priority(7), Timestamp(0)),
            ScheduleItem::new(FunctionId::from("m.real"), ScheduleOptions::new(), Timestamp(0)),
        ];
        let clock = ManualClock::new(Timestamp(5));
        let config = RuntimeConfig {
            clock: Box::new(clock),
            scheduler: Scheduler::from_items(items),
            state: StateStore::new(),
        };
        let mut rt = Runtime::with_config(config).unwrap();
        rt.register_module(Module::new("m").with_function("real", |iface, _| iface.set("ran", true)))
            .unwrap();

        assert_eq!(rt.tick(), Ok(true));
        assert_eq!(rt.interface().get("ran"), Some(json!(true)));
        assert_eq!(rt.tick(), Ok(false));

        let m = rt.metrics();
        assert_eq!(m.skipped_unknown_module, 2);
        assert_eq!(m.skipped_unknown_function, 1);
        assert_eq!(m.ticks_executed, 1);
        assert_eq!(m.pending_items, 0);
    }

    #[test]
    fn function_error_propagates_and_consumes_item() {
        let (mut rt, _) = runtime_at(0);
        rt.register_module(
            Module::new("m")
                .with_init(|iface| iface.schedule("fail", ScheduleOptions::new()))
                .with_function("fail", |_, _| Err(RuntimeError::callback("bad turn"))),
        )
        .unwrap();
        assert_eq!(rt.tick(), Err(RuntimeError::callback("bad turn")));
        assert_eq!(rt.interface().current_module(), None);
        assert_eq!(rt.tick(), Ok(false));
    }

    #[test]
    fn restored_runtime_has_no_modules_or_triggers() {
        let (mut rt, _) = runtime_at(0);
        rt.register_module(Module::new("m").with_init(|iface| {
            iface.add_trigger("k", |_, _, _| Ok(()))?;
            iface.set("k", 1)?;
            iface.schedule("later", ScheduleOptions::new().delay(100))
        }))
        .unwrap();
        assert_eq!(rt.metrics().triggers, 1);

        let text = rt.to_snapshot().unwrap();
        let restored = Runtime::from_snapshot_with_clock(&text, ManualClock::new(Timestamp(0))).unwrap();
        let m = restored.metrics();
        assert_eq!(m.modules, 0);
        assert_eq!(m.triggers, 0);
        assert_eq!(m.pending_items, 1);
        assert_eq!(restored.interface().get("k"), Some(json!(1)));
    }

    #[test]
    fn invalid_snapshot_item_rejected() {
        let text = r#"{"schedule":[{"id":"m.f","when":10,"until":5}],"state":{}}"#;
        assert!(matches!(
            Runtime::from_snapshot(text),
            Err(SnapshotError::Config(ConfigError::InvalidScheduleItem { index: 0, .. }))
        ));
    }
}
