//! Reusable module and trigger fixtures.
//!
//! - [`recording_module`]: a module whose functions only log their calls.
//! - [`recording_trigger`]: a trigger callback that logs `(new, old)`.
//! - [`counter_module`]: increments a state key and reschedules itself.

use cadence_core::{ScheduleOptions, Value};
use cadence_engine::{CallResult, Interface, Module};

use crate::CallLog;

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// `"<module>.<function>"` for functions, a caller-chosen label for triggers.
    pub label: String,
    /// Module executing when the call ran.
    pub context: Option<String>,
    /// Payload (functions) or new value (triggers).
    pub value: Option<Value>,
    /// Previous value (triggers only).
    pub old: Option<Value>,
}

/// A module named `name` with one logging function per entry in `functions`.
pub fn recording_module(name: &str, functions: &[&str], log: &CallLog) -> Module {
    let mut module = Module::new(name);
    for function in functions {
        let label = format!("{name}.{function}");
        let log = log.clone();
        module = module.with_function(*function, move |iface, data| {
            log.push(LogEntry {
                label: label.clone(),
                context: iface.current_module(),
                value: data.cloned(),
                old: None,
            });
            Ok(())
        });
    }
    module
}

/// A trigger callback that logs under `label`.
pub fn recording_trigger(
    label: &str,
    log: &CallLog,
) -> impl Fn(&Interface, &Value, Option<&Value>) -> CallResult + Clone + Send + Sync + 'static {
    let label = label.to_string();
    let log = log.clone();
    move |iface, new, old| {
        log.push(LogEntry {
            label: label.clone(),
            context: iface.current_module(),
            value: Some(new.clone()),
            old: old.cloned(),
        });
        Ok(())
    }
}

/// A module that adds one to `key` every `period` ms, starting at `period`
/// after registration.
pub fn counter_module(name: &str, key: &str, period: u64) -> Module {
    let init_key = key.to_string();
    let step_key = key.to_string();
    Module::new(name)
        .with_init(move |iface| {
            iface.set(init_key.as_str(), 0)?;
            iface.schedule("step", ScheduleOptions::new().delay(period))
        })
        .with_function("step", move |iface, _| {
            let next = iface
                .get(&step_key)
                .and_then(|v| v.as_i64())
                .unwrap_or(0)
                + 1;
            iface.set(step_key.as_str(), next)?;
            iface.schedule("step", ScheduleOptions::new().delay(period))
        })
}
