//! Runtime configuration and validation.
//!
//! [`RuntimeConfig`] is the builder input for a [`Runtime`](crate::Runtime):
//! the clock to schedule against and the seeded schedule and state.
//! [`validate()`](RuntimeConfig::validate) checks seeded items before the
//! runtime takes ownership of them.

use cadence_core::{Clock, SystemClock};
use thiserror::Error;

use crate::scheduler::Scheduler;
use crate::state::StateStore;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`RuntimeConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A seeded schedule item violates the item invariants.
    #[error("schedule item {index}: {reason}")]
    InvalidScheduleItem {
        /// Position of the item among the live seeded items.
        index: usize,
        /// Description of the violated invariant.
        reason: String,
    },
}

// ── RuntimeConfig ──────────────────────────────────────────────────

/// Everything needed to construct a [`Runtime`](crate::Runtime).
///
/// Modules and triggers are not part of the configuration: they are code,
/// and are registered on the constructed runtime.
pub struct RuntimeConfig {
    /// Time source for scheduling and dispatch.
    pub clock: Box<dyn Clock>,
    /// Pending items carried over from a previous session.
    pub scheduler: Scheduler,
    /// State carried over from a previous session.
    pub state: StateStore,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            clock: Box::new(SystemClock),
            scheduler: Scheduler::new(),
            state: StateStore::new(),
        }
    }
}

impl RuntimeConfig {
    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Check every live seeded item.
    ///
    /// Ids are not resolved here: unknown modules or functions are a
    /// dispatch-time concern and are skipped then.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, item) in self.scheduler.pending().enumerate() {
            if item.id.as_str().is_empty() {
                return Err(ConfigError::InvalidScheduleItem {
                    index,
                    reason: "empty id".to_string(),
                });
            }
            if let Some(until) = item.until {
                if until < item.when {
                    return Err(ConfigError::InvalidScheduleItem {
                        index,
                        reason: format!("until {until} precedes when {}", item.when),
                    });
                }
            }
        }
        Ok(())
    }
}
