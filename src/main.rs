//! Room control loop — main entry point.
//!
//! Hexagonal wiring: adapters on the outside, [`AppService`] in the
//! middle, one single-threaded tick loop driving everything.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                   │
//! │                                                           │
//! │  SimHardware      LogEventSink    FileConfigStore         │
//! │  (Sensor+Actuator)(EventSink)     (ConfigPort)            │
//! │  LoggingCloud     MonotonicClock                          │
//! │  (CloudPort)      (Clock)                                 │
//! │                                                           │
//! │  ─────────────── Port Trait Boundary ───────────────      │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │               AppService (pure logic)               │  │
//! │  │  conditioning · faults · mode · hysteresis · sync   │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! No CLI surface beyond an optional config file path; the process runs
//! until killed. Startup fails fast on invalid configuration.

use anyhow::{Context, Result};
use log::info;

use roomctl::adapters::cloud::LoggingCloud;
use roomctl::adapters::config::FileConfigStore;
use roomctl::adapters::hardware::SimHardware;
use roomctl::adapters::log_sink::LogEventSink;
use roomctl::adapters::time::MonotonicClock;
use roomctl::app::ports::{Clock, ConfigPort};
use roomctl::app::service::AppService;

fn main() -> Result<()> {
    // ── Structured logging (bridges the core's `log` records) ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Configuration (fatal on invalid values) ───────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "roomctl.json".into());
    let store = FileConfigStore::new(&config_path);
    let config = store
        .load()
        .with_context(|| format!("loading {config_path}"))?;
    info!("config loaded from {config_path}");

    // ── Adapter wiring ────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut hw = SimHardware::new(&config);
    let mut cloud = LoggingCloud::new();
    let mut sink = LogEventSink::new();

    let mut service = AppService::new(&config).context("invalid configuration")?;
    service.start(&mut sink);

    // ── Control loop ──────────────────────────────────────────
    //
    // One iteration per sensor tick; logging and cloud cadences are
    // derived inside the service from the same monotonic clock.
    let tick = std::time::Duration::from_millis(u64::from(config.timing.sensor_tick_ms));
    loop {
        // Keep the simulated inputs gently moving so the fault detectors
        // see a live signal (a frozen input *is* a flatline).
        let t = service.tick_count() as i32;
        hw.set_ldr(1500 + (t * 37) % 23);
        hw.set_temp_dc(220 + (t * 13) % 7);
        hw.set_aq(150 + (t * 11) % 19);
        hw.set_presence(false, clock.now_ms());

        service.tick(&mut hw, &mut cloud, &clock, &mut sink);
        std::thread::sleep(tick);
    }
}
