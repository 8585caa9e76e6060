//! Modules: named bundles of callable functions.
//!
//! A [`Module`] is built once, with an explicit name → callable table,
//! and is immutable after registration. Scheduling by handle resolves the
//! handle back to its name by pointer identity in that same table, so no
//! runtime member enumeration is needed.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use cadence_core::{RuntimeError, Value};

use crate::interface::Interface;

/// Outcome of any module-owned callable.
pub type CallResult = Result<(), RuntimeError>;

/// A schedulable module function: `(interface, data)`.
pub type ModuleFn = Arc<dyn Fn(&Interface, Option<&Value>) -> CallResult + Send + Sync>;

/// A module's one-time initializer.
pub type InitFn = Arc<dyn Fn(&Interface) -> CallResult + Send + Sync>;

/// Wrap a closure as a [`ModuleFn`] handle.
///
/// Keep a clone of the handle to schedule the function by reference from
/// inside the module (typically from `init`).
///
/// # Examples
///
/// ```
/// use cadence_engine::{function, Module, ScheduleOptions};
///
/// let bump = function(|iface, _| iface.set("h", 100));
/// let handle = bump.clone();
/// let module = Module::new("mymod")
///     .with_handle("bump", bump)
///     .with_init(move |iface| iface.schedule(&handle, ScheduleOptions::new()));
/// assert_eq!(module.function_names().collect::<Vec<_>>(), vec!["bump"]);
/// ```
pub fn function<F>(f: F) -> ModuleFn
where
    F: Fn(&Interface, Option<&Value>) -> CallResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named unit of domain logic.
pub struct Module {
    name: String,
    functions: IndexMap<String, ModuleFn>,
    init: Option<InitFn>,
}

impl Module {
    /// A module with no functions and no initializer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
            init: None,
        }
    }

    /// Set the initializer, run once at registration.
    pub fn with_init<F>(mut self, f: F) -> Self
    where
        F: Fn(&Interface) -> CallResult + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(f));
        self
    }

    /// Add a function from a closure. A later entry with the same name
    /// replaces the earlier one.
    pub fn with_function<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Interface, Option<&Value>) -> CallResult + Send + Sync + 'static,
    {
        self.with_handle(name, function(f))
    }

    /// Add a function from an existing handle.
    pub fn with_handle(mut self, name: impl Into<String>, handle: ModuleFn) -> Self {
        self.functions.insert(name.into(), handle);
        self
    }

    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&ModuleFn> {
        self.functions.get(name)
    }

    /// Function names in registration order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Whether an initializer is set.
    pub fn has_init(&self) -> bool {
        self.init.is_some()
    }

    /// Reverse lookup: the name under which `handle` is registered here.
    pub fn resolve_handle(&self, handle: &ModuleFn) -> Option<&str> {
        self.functions
            .iter()
            .find(|(_, f)| Arc::ptr_eq(f, handle))
            .map(|(name, _)| name.as_str())
    }

    pub(crate) fn init(&self) -> Option<&InitFn> {
        self.init.as_ref()
    }

    /// Check the name can be used as the module half of a `FunctionId`.
    pub(crate) fn validate(&self) -> Result<(), RuntimeError> {
        if self.name.is_empty() {
            return Err(RuntimeError::Validation {
                reason: "module name must not be empty".to_string(),
            });
        }
        if self.name.contains('.') {
            return Err(RuntimeError::Validation {
                reason: format!("module name '{}' must not contain '.'", self.name),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("init", &self.init.is_some())
            .finish()
    }
}
