//! Test utilities and fixture modules for Cadence development.
//!
//! Provides a shared [`CallLog`], a [`TestRuntimeBuilder`] that wires a
//! [`ManualClock`] into a fresh runtime, and reusable modules in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use cadence_core::{ManualClock, Timestamp, Value};
use cadence_engine::{Runtime, RuntimeConfig, Scheduler, StateStore};

pub use fixtures::{recording_module, recording_trigger, LogEntry};

/// Thread-safe, cloneable log of calls made by fixture modules.
///
/// Clones share the same entries, so a test keeps one handle and moves
/// another into module closures.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Copy of every entry so far, in call order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Just the labels, in call order.
    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.label).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for runtimes driven by a [`ManualClock`].
pub struct TestRuntimeBuilder {
    start: Timestamp,
    scheduler: Scheduler,
    state: StateStore,
}

impl TestRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            start: Timestamp(1_000_000),
            scheduler: Scheduler::new(),
            state: StateStore::new(),
        }
    }

    /// Clock start time. Default: 1,000,000 ms.
    pub fn start_at(mut self, start: Timestamp) -> Self {
        self.start = start;
        self
    }

    /// Seed a state entry.
    pub fn with_state(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.state.set(key, value.into());
        self
    }

    /// Seed the schedule.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Build the runtime and return it with a handle to its clock.
    ///
    /// # Panics
    ///
    /// Panics if the seeded schedule fails validation.
    pub fn build(self) -> (Runtime, ManualClock) {
        let clock = ManualClock::new(self.start);
        let config = RuntimeConfig {
            clock: Box::new(clock.clone()),
            scheduler: self.scheduler,
            state: self.state,
        };
        let runtime = Runtime::with_config(config).expect("test runtime config must be valid");
        (runtime, clock)
    }
}

impl Default for TestRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
