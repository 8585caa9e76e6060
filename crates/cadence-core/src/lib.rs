//! Core types and traits for the Cadence turn-based runtime.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by the rest of the workspace: timestamps and function
//! identifiers, schedule records and options, the [`Clock`] abstraction,
//! and the errors module code sees.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod id;
pub mod item;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RuntimeError;
pub use id::{FunctionId, Timestamp};
pub use item::{ScheduleItem, ScheduleOptions};

/// Opaque value stored in state and carried as scheduled-call payload.
///
/// The runtime never inspects it; it only moves, clones, and serializes it.
pub use serde_json::Value;
