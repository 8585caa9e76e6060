//! Strongly-typed identifiers: [`Timestamp`] and [`FunctionId`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute point in time, in milliseconds since the Unix epoch.
///
/// Every scheduling decision is made against a `Timestamp` supplied by a
/// [`Clock`](crate::Clock), never against the wall clock directly.
/// Serializes as a bare JSON number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The timestamp `ms` milliseconds after `self`, saturating at `u64::MAX`.
    pub fn after(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Fully qualified name of a module function: `"<module>.<function>"`.
///
/// Module names never contain a `.` (registration rejects them), so the
/// id splits unambiguously on its first `.`. Function names may contain
/// further dots. An id with no `.` at all is representable (a restored
/// snapshot may carry one) but never resolves to a callable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
    /// Join a module name and a function name.
    pub fn new(module: &str, function: &str) -> Self {
        Self(format!("{module}.{function}"))
    }

    /// The module half of the id, or `None` if the id has no `.`.
    pub fn module(&self) -> Option<&str> {
        self.split().map(|(m, _)| m)
    }

    /// The function half of the id, or `None` if the id has no `.`.
    pub fn function(&self) -> Option<&str> {
        self.split().map(|(_, f)| f)
    }

    /// Split into `(module, function)` on the first `.`.
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once('.')
    }

    /// The raw id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for FunctionId {
    fn from(v: String) -> Self {
        Self(v)
    }
}
