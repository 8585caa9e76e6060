//! Errors raised synchronously to module code.
//!
//! Every variant represents a module-authorship mistake (or a failure the
//! module itself reports) and aborts the call that produced it. Stale
//! references met while dispatching a scheduled item are not errors; the
//! runtime logs and skips them.

use thiserror::Error;

/// Errors returned by runtime registration and the module-facing interface.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Module registration was malformed (empty name, or a name containing
    /// the `.` id separator).
    #[error("invalid module: {reason}")]
    Validation {
        /// Description of what was wrong.
        reason: String,
    },
    /// A module with this name is already registered.
    #[error("module '{name}' is already registered")]
    Duplicate {
        /// The conflicting module name.
        name: String,
    },
    /// A state or scheduling operation was attempted while no module was
    /// executing.
    #[error("cannot {operation} outside of a module")]
    Context {
        /// The operation that was rejected (`"set"`, `"schedule"`, ...).
        operation: &'static str,
    },
    /// A function handle passed to `schedule` is not one of the current
    /// module's own registered functions.
    #[error("function is not registered on module '{module}'")]
    Resolution {
        /// The module that was executing when resolution failed.
        module: String,
    },
    /// Module code reported a failure of its own.
    #[error("callback failed: {reason}")]
    Callback {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl RuntimeError {
    /// Shorthand for a module-reported [`RuntimeError::Callback`] failure.
    pub fn callback(reason: impl Into<String>) -> Self {
        Self::Callback {
            reason: reason.into(),
        }
    }
}
