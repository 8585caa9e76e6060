//! Cumulative runtime counters.
//!
//! [`RuntimeMetrics`] is a point-in-time copy, read with
//! [`Runtime::metrics()`](crate::Runtime::metrics), for host telemetry and
//! tests.

/// Counters accumulated since the runtime was constructed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeMetrics {
    /// `tick()` calls that executed a scheduled function.
    pub ticks_executed: u64,
    /// `tick()` calls that found nothing ready.
    pub idle_ticks: u64,
    /// Items dropped at dispatch because their module is not registered
    /// (or their id has no module part).
    pub skipped_unknown_module: u64,
    /// Items dropped at dispatch because their module has no such function.
    pub skipped_unknown_function: u64,
    /// Items scheduled through the interface.
    pub items_scheduled: u64,
    /// Items tombstoned because they expired before being picked.
    pub items_expired: u64,
    /// Live items currently waiting in the schedule.
    pub pending_items: usize,
    /// Registered modules.
    pub modules: usize,
    /// Registered triggers, across all keys.
    pub triggers: usize,
}
