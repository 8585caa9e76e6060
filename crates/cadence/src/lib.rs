//! Cadence: a deterministic turn-based runtime for modular simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Cadence sub-crates. For most users, adding `cadence` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cadence::prelude::*;
//!
//! // A clock the host advances by hand.
//! let clock = ManualClock::new(Timestamp(0));
//! let mut runtime = Runtime::with_config(RuntimeConfig {
//!     clock: Box::new(clock.clone()),
//!     ..RuntimeConfig::default()
//! })
//! .unwrap();
//!
//! let grow = Module::new("garden")
//!     .with_init(|iface| {
//!         iface.set("height", 0)?;
//!         iface.schedule("grow", ScheduleOptions::new().delay(100))
//!     })
//!     .with_function("grow", |iface, _| {
//!         let h = iface.get("height").and_then(|v| v.as_i64()).unwrap_or(0);
//!         iface.set("height", h + 1)?;
//!         iface.schedule("grow", ScheduleOptions::new().delay(100))
//!     });
//! runtime.register_module(grow).unwrap();
//!
//! assert!(!runtime.tick().unwrap());
//! clock.advance(100);
//! assert!(runtime.tick().unwrap());
//! assert_eq!(runtime.interface().get("height"), Some(Value::from(1)));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cadence-core` | IDs, timestamps, schedule items, clocks, errors |
//! | [`engine`] | `cadence-engine` | Runtime, scheduler, state, interface, snapshots |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, clocks, and errors (`cadence-core`).
///
/// Contains [`types::FunctionId`], [`types::Timestamp`],
/// [`types::ScheduleItem`], the [`types::Clock`] trait, and
/// [`types::RuntimeError`].
pub use cadence_core as types;

/// The runtime and everything it owns (`cadence-engine`).
///
/// [`engine::Runtime`] registers modules and dispatches one call per tick;
/// [`engine::Interface`] is what module code sees.
pub use cadence_engine as engine;

/// Common imports for typical Cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use cadence_core::{
        Clock, FunctionId, ManualClock, ScheduleOptions, SystemClock, Timestamp, Value,
    };

    // Errors
    pub use cadence_core::RuntimeError;
    pub use cadence_engine::{ConfigError, SnapshotError};

    // Engine
    pub use cadence_engine::{
        function, CallResult, FunctionRef, Interface, Module, ModuleFn, Runtime, RuntimeConfig,
        RuntimeMetrics, Scheduler, Snapshot, StateStore,
    };
}
