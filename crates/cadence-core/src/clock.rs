//! Time sources for the scheduler.
//!
//! The runtime reads "now" through the [`Clock`] trait so hosts can run
//! against the wall clock while tests and replays drive time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::id::Timestamp;

/// A source of the current time.
pub trait Clock: Send {
    /// The current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch.
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().min(u64::MAX as u128) as u64)
            .unwrap_or(0);
        Timestamp(ms)
    }
}

/// Manually driven clock.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the runtime.
///
/// # Examples
///
/// ```
/// use cadence_core::{Clock, ManualClock, Timestamp};
///
/// let clock = ManualClock::new(Timestamp(1_000));
/// let handle = clock.clone();
/// handle.advance(250);
/// assert_eq!(clock.now(), Timestamp(1_250));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start.0)),
        }
    }

    /// Jump to an absolute time. Moving backwards is allowed.
    pub fn set(&self, t: Timestamp) {
        self.now.store(t.0, Ordering::Relaxed);
    }

    /// Move forward by `ms` milliseconds, saturating.
    pub fn advance(&self, ms: u64) {
        let current = self.now.load(Ordering::Relaxed);
        self.now
            .store(current.saturating_add(ms), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::Relaxed))
    }
}
