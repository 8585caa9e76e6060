//! Snapshot export and import.
//!
//! A [`Snapshot`] is the persisted form of a runtime: live schedule items
//! and the state mapping. Modules and triggers are code and are never part
//! of it; after restoring, the host re-registers its modules.
//!
//! ```json
//! {
//!   "schedule": [ { "id": "mymod.bump", "priority": 1, "when": 1700000000000 } ],
//!   "state": { "happiness": 25 }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cadence_core::{ScheduleItem, Value};

use crate::config::ConfigError;

/// Errors from encoding or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot text is not valid JSON of the expected shape, or a
    /// value could not be encoded.
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot decoded but its items violate the item invariants.
    #[error("snapshot config: {0}")]
    Config(#[from] ConfigError),
}

/// Full persisted runtime state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Live schedule items, ascending by `when`.
    ///
    /// `"scheduler"` is accepted on import for snapshots written under
    /// that key.
    #[serde(default, alias = "scheduler")]
    pub schedule: Vec<ScheduleItem>,
    /// State mapping, in first-insertion order.
    #[serde(default)]
    pub state: IndexMap<String, Value>,
}

impl Snapshot {
    /// Encode as JSON text.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}
