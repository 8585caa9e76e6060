//! Pending invocation records and the options that create them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::{FunctionId, Timestamp};
use crate::Value;

/// One pending invocation of a module function.
///
/// Created by scheduling, consumed at most once. Selection and expiry
/// tombstone the item (`garbage`) instead of removing it; tombstoned
/// items are filtered out when the schedule is exported.
///
/// Serialized form (the `garbage` flag is never written):
///
/// ```json
/// { "id": "mymod.bump", "data": {"n": 1}, "priority": 2, "when": 1000, "until": 1500 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Target function, `"<module>.<function>"`.
    pub id: FunctionId,
    /// Payload handed to the function when it fires.
    ///
    /// An explicit `null` payload is `Some(Value::Null)` and survives a
    /// snapshot round trip; only an absent field reads back as `None`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub data: Option<Value>,
    /// Selection priority. Higher values are preferred among ready items.
    ///
    /// Any finite number; whole values are written as JSON integers.
    #[serde(default, serialize_with = "serialize_priority")]
    pub priority: f64,
    /// Earliest time the item may fire.
    pub when: Timestamp,
    /// Last time the item may fire. `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<Timestamp>,
    /// Set once the item has been selected or found expired.
    #[serde(skip)]
    pub garbage: bool,
}

impl ScheduleItem {
    /// Build an item for `id` from `options`, relative to `now`.
    ///
    /// `when = now + delay`; `until = when + expire_after` when an
    /// expiry is requested. Both additions saturate, so `until >= when`
    /// always holds for items built here.
    pub fn new(id: FunctionId, options: ScheduleOptions, now: Timestamp) -> Self {
        let when = now.after(options.delay);
        Self {
            id,
            data: options.data,
            priority: options.priority,
            when,
            until: options.expire_after.map(|ms| when.after(ms)),
            garbage: false,
        }
    }

    /// Whether `when` has been reached.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.when <= now
    }

    /// Whether the expiration window closed before `now`.
    ///
    /// An item whose `until` equals `now` is still live.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.until.is_some_and(|until| until < now)
    }
}

/// A field that is present deserializes to `Some`, including `null`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn serialize_priority<S: Serializer>(priority: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // 2^53: beyond this an f64 no longer holds every integer.
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if priority.fract() == 0.0 && priority.abs() <= EXACT {
        serializer.serialize_i64(*priority as i64)
    } else {
        serializer.serialize_f64(*priority)
    }
}

/// Options accepted by `schedule`.
///
/// # Examples
///
/// ```
/// use cadence_core::ScheduleOptions;
///
/// let opts = ScheduleOptions::new().delay(100).priority(3).expire_after(50);
/// assert_eq!(opts.delay, 100);
/// assert_eq!(opts.expire_after, Some(50));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleOptions {
    /// Milliseconds from now until the item becomes due. Default 0.
    pub delay: u64,
    /// Selection priority. Default 0.
    pub priority: f64,
    /// Milliseconds after `when` at which the item expires. `None` never expires.
    pub expire_after: Option<u64>,
    /// Payload delivered to the invoked function.
    pub data: Option<Value>,
}

impl ScheduleOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay in milliseconds.
    pub fn delay(mut self, ms: u64) -> Self {
        self.delay = ms;
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: impl Into<f64>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Expire the item `ms` milliseconds after it becomes due.
    pub fn expire_after(mut self, ms: u64) -> Self {
        self.expire_after = Some(ms);
        self
    }

    /// Attach a payload.
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }
}
