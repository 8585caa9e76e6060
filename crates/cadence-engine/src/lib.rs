//! Runtime, scheduler, and module interface for Cadence simulations.
//!
//! Provides the [`Runtime`] that registers modules and dispatches one
//! scheduled call per [`tick()`](Runtime::tick), the [`Scheduler`] that
//! picks which call, the [`StateStore`] modules share, and the
//! [`Interface`] through which module code reaches both.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod interface;
pub mod metrics;
pub mod module;
pub mod runtime;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod trigger;

pub use cadence_core::{
    Clock, FunctionId, ManualClock, RuntimeError, ScheduleItem, ScheduleOptions, SystemClock,
    Timestamp, Value,
};
pub use config::{ConfigError, RuntimeConfig};
pub use context::ExecutionContextStack;
pub use interface::{FunctionRef, Interface};
pub use metrics::RuntimeMetrics;
pub use module::{function, CallResult, InitFn, Module, ModuleFn};
pub use runtime::Runtime;
pub use scheduler::{Scheduler, SchedulerStats};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::StateStore;
pub use trigger::TriggerFn;
