//! Benchmark profiles and utilities for the Cadence runtime.
//!
//! Provides pre-built workloads for benchmarking:
//!
//! - [`schedule_profile`]: a seeded spread of pending items across a time horizon
//! - [`busy_runtime`]: self-rescheduling modules plus a trigger observer
//! - [`mix`]: the deterministic hash the profiles draw from

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cadence_core::{FunctionId, ManualClock, ScheduleItem, ScheduleOptions, Timestamp};
use cadence_engine::{Module, Runtime, RuntimeConfig, RuntimeError};

/// Time span, in ms, that [`schedule_profile`] spreads `when` across.
pub const HORIZON_MS: u64 = 10_000;

/// Modules referenced by [`schedule_profile`] item ids.
pub const PROFILE_MODULES: usize = 16;

/// Deterministic 64-bit mix of `seed` and `i`.
pub fn mix(seed: u64, i: u64) -> u64 {
    let mut h = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(i.wrapping_mul(1442695040888963407));
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^ (h >> 33)
}

/// Build `n` pending items with ids `bench{k}.work`.
///
/// `when` is spread over [`HORIZON_MS`], priorities fall in `-4..4`, and
/// every fourth item carries an expiration window of up to 500 ms.
pub fn schedule_profile(n: usize, seed: u64) -> Vec<ScheduleItem> {
    (0..n as u64)
        .map(|i| {
            let h = mix(seed, i);
            let when = h % HORIZON_MS;
            ScheduleItem {
                id: FunctionId::new(&format!("bench{}", i as usize % PROFILE_MODULES), "work"),
                data: None,
                priority: ((h >> 16) % 8) as f64 - 4.0,
                when: Timestamp(when),
                until: (i % 4 == 0).then(|| Timestamp(when + (h >> 32) % 500)),
                garbage: false,
            }
        })
        .collect()
}

/// Build a runtime with `modules` counters, each stepping every `period`
/// ms at a staggered offset, plus an `observer` module whose trigger
/// fires on every write to `"total"`.
///
/// The returned clock starts at zero.
pub fn busy_runtime(
    modules: usize,
    period: u64,
) -> Result<(Runtime, ManualClock), Box<dyn std::error::Error>> {
    let clock = ManualClock::new(Timestamp(0));
    let mut runtime = Runtime::with_config(RuntimeConfig::default().with_clock(clock.clone()))?;

    runtime.register_module(Module::new("observer").with_init(|iface| {
        iface.add_trigger("total", |iface, new, _old| {
            iface.set("last_total", new.clone())
        })
    }))?;

    for i in 0..modules {
        runtime.register_module(counter(&format!("counter{i}"), period, i as u64))?;
    }
    Ok((runtime, clock))
}

fn counter(name: &str, period: u64, offset: u64) -> Module {
    let key = name.to_string();
    Module::new(name)
        .with_init(move |iface| {
            iface.schedule("step", ScheduleOptions::new().delay(period + offset))
        })
        .with_function("step", move |iface, _| step(iface, &key, period))
}

fn step(iface: &cadence_engine::Interface, key: &str, period: u64) -> Result<(), RuntimeError> {
    let mine = iface.get(key).and_then(|v| v.as_i64()).unwrap_or(0) + 1;
    iface.set(key, mine)?;
    let total = iface.get("total").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
    iface.set("total", total)?;
    iface.schedule("step", ScheduleOptions::new().delay(period))
}
