//! Time- and priority-ordered set of pending invocations.
//!
//! [`Scheduler`] keeps its items sorted ascending by `when`. Items are
//! consumed by tombstoning (`garbage = true`) rather than removal;
//! tombstones are dropped when the schedule is exported or explicitly
//! compacted between ticks.
//!
//! # Selection
//!
//! [`next_ready()`](Scheduler::next_ready) scans in `when` order up to the
//! first item that is not yet due. Along the way it tombstones every due
//! item whose expiration window has closed. Among the remaining due items
//! it picks the highest `priority`; equal priorities go to the item
//! scanned first, i.e. the earliest `when`, then the earliest inserted.

use cadence_core::{ScheduleItem, Timestamp};

/// Cumulative scheduler counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Items inserted through [`Scheduler::insert`].
    pub scheduled: u64,
    /// Items returned by [`Scheduler::next_ready`].
    pub dispatched: u64,
    /// Items tombstoned because their window closed before they were picked.
    pub expired: u64,
}

/// Pending invocation records, ascending by `when`.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    items: Vec<ScheduleItem>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// An empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed from exported items.
    ///
    /// Items are stably re-sorted by `when`, so an already ordered
    /// snapshot is kept verbatim and equal-`when` items keep their
    /// relative order.
    pub fn from_items(mut items: Vec<ScheduleItem>) -> Self {
        items.sort_by_key(|item| item.when);
        Self {
            items,
            stats: SchedulerStats::default(),
        }
    }

    /// Insert `item` after every stored item with `when <= item.when`.
    pub fn insert(&mut self, item: ScheduleItem) {
        let index = self.items.partition_point(|existing| existing.when <= item.when);
        self.items.insert(index, item);
        self.stats.scheduled += 1;
    }

    /// Select, tombstone, and return the item to execute at `now`.
    ///
    /// Returns `None` if nothing is due. Expired due items met during the
    /// scan are tombstoned and never returned.
    pub fn next_ready(&mut self, now: Timestamp) -> Option<ScheduleItem> {
        let mut selected: Option<(usize, f64)> = None;

        for (index, item) in self.items.iter_mut().enumerate() {
            if item.garbage {
                continue;
            }
            if !item.is_due(now) {
                break;
            }
            if item.is_expired(now) {
                item.garbage = true;
                self.stats.expired += 1;
                tracing::debug!(id = %item.id, until = ?item.until, %now, "schedule item expired");
                continue;
            }
            match selected {
                Some((_, best)) if best.total_cmp(&item.priority).is_ge() => {}
                _ => selected = Some((index, item.priority)),
            }
        }

        let (index, _) = selected?;
        let item = &mut self.items[index];
        item.garbage = true;
        self.stats.dispatched += 1;
        Some(item.clone())
    }

    /// Live items in stored order, for snapshots.
    pub fn export(&self) -> Vec<ScheduleItem> {
        self.pending().cloned().collect()
    }

    /// Iterate live (non-tombstoned) items in stored order.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.items.iter().filter(|item| !item.garbage)
    }

    /// Number of live items.
    pub fn pending_len(&self) -> usize {
        self.pending().count()
    }

    /// Number of stored items, tombstones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stored at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Earliest `when` among live items.
    ///
    /// A host can sleep until this time instead of polling `tick()`.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.pending().next().map(|item| item.when)
    }

    /// Physically drop tombstoned items.
    ///
    /// Never called by the scan itself; hosts may call it between ticks to
    /// bound memory on long runs without exporting.
    pub fn compact(&mut self) {
        self.items.retain(|item| !item.garbage);
    }

    /// Cumulative counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}
