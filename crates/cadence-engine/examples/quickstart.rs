//! Cadence quickstart: one module, one trigger, one delayed call.
//!
//! Demonstrates:
//!   1. Building a runtime on a manual clock
//!   2. Registering a module whose init seeds state, adds a trigger, and
//!      schedules a function by handle with an expiration window
//!   3. Ticking the runtime on a fixed interval until the call fires
//!   4. Exporting a snapshot
//!
//! Run with:
//!   RUST_LOG=cadence_engine=debug cargo run --example quickstart

use cadence_core::{ManualClock, ScheduleOptions, Timestamp};
use cadence_engine::{function, Module, Runtime, RuntimeConfig};
use tracing_subscriber::EnvFilter;

// ─── Timing ─────────────────────────────────────────────────────

const TICK_INTERVAL_MS: u64 = 1_500;
const TICKS: usize = 10;
const HAPPY_DELAY_MS: u64 = 10_000;
const HAPPY_WINDOW_MS: u64 = 10_000;

fn mymod() -> Module {
    let make_happy = function(|iface, _| iface.set("happiness", 100));
    let handle = make_happy.clone();

    Module::new("mymod")
        .with_handle("make_happy", make_happy)
        .with_init(move |iface| {
            println!("Initialized mymod");
            iface.set("happiness", 25)?;
            iface.add_trigger("happiness", |_, value, old| {
                let old = old.map(ToString::to_string).unwrap_or_else(|| "nothing".into());
                println!("At first I was like {old} but then I was like {value}");
                Ok(())
            })?;
            iface.schedule(
                &handle,
                ScheduleOptions::new()
                    .delay(HAPPY_DELAY_MS)
                    .expire_after(HAPPY_WINDOW_MS),
            )
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock = ManualClock::new(Timestamp(0));
    let mut runtime = Runtime::with_config(RuntimeConfig::default().with_clock(clock.clone()))?;
    runtime.register_module(mymod())?;

    for i in 0..TICKS {
        clock.set(Timestamp(i as u64 * TICK_INTERVAL_MS));
        println!("ticking runtime at {}...", runtime.now());
        runtime.tick()?;
    }

    println!("snapshot: {}", runtime.to_snapshot()?);
    println!("metrics: {:?}", runtime.metrics());
    Ok(())
}
