//! Offline tolerance: ring-buffer bounds, backoff pacing, and full drain
//! after reconnection (no loss beyond the ring, no duplication).

use roomctl::adapters::time::ManualClock;
use roomctl::app::events::AppEvent;
use roomctl::app::ports::Clock;
use roomctl::app::service::AppService;
use roomctl::config::RoomConfig;
use roomctl::control::ChannelId;

use crate::mock_hw::{MockCloud, MockHardware, RecordingSink};

fn service(config: &RoomConfig) -> AppService {
    AppService::new(config).expect("valid config")
}

fn tick(
    svc: &mut AppService,
    hw: &mut MockHardware,
    cloud: &mut MockCloud,
    clock: &ManualClock,
    sink: &mut RecordingSink,
) {
    clock.advance(500);
    hw.set_presence(true, clock.now_ms());
    svc.tick(hw, cloud, clock, sink);
}

// ───────────────────────────────────────────────────────────────
// Disconnect, fill to capacity, reconnect, drain
// ───────────────────────────────────────────────────────────────

#[test]
fn offline_fill_then_complete_drain_without_duplication() {
    // Drain faster than the 2 s logging tick adds, so the backlog can
    // actually empty after reconnection.
    let mut config = RoomConfig::default();
    config.timing.cloud_tick_ms = 500;

    let mut svc = service(&config);
    let mut hw = MockHardware::new();
    let mut cloud = MockCloud::offline();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    hw.ldr_raw = 3400; // keep the lighting channel busy

    // Five minutes offline at a 2-second logging tick: 300+ snapshots,
    // bounded by the ring capacity of 200.
    for _ in 0..600 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
        assert!(svc.buffer().len() <= svc.buffer().capacity());
    }
    assert_eq!(svc.buffer().len(), 200, "ring fills to capacity, no further");
    assert!(svc.buffer().evicted_total() > 0, "overflow evicts oldest-first");
    assert!(!svc.online());

    // Local control never stopped: the light is on despite the outage.
    assert!(hw.last_light().unwrap().on);

    // Reconnect and run until every entry has been delivered.
    cloud.online = true;
    let mut drained = false;
    for _ in 0..2000 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
        if svc.buffer().unsent_count() == 0 {
            drained = true;
            break;
        }
    }
    assert!(drained, "backlog must drain completely after reconnection");

    // No duplicate deliveries: every (channel, ts) key pushed once.
    let mut keys = cloud.pushed_logs.clone();
    keys.sort_unstable_by_key(|(c, ts)| (*ts, *c == ChannelId::Climate));
    let before = keys.len();
    keys.dedup();
    assert_eq!(keys.len(), before, "log entries must not be re-sent");
}

// ───────────────────────────────────────────────────────────────
// Exponential backoff
// ───────────────────────────────────────────────────────────────

#[test]
fn backoff_spaces_out_attempts_while_offline() {
    let config = RoomConfig::default();
    let mut svc = service(&config);
    let mut hw = MockHardware::new();
    let mut cloud = MockCloud::offline();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    // 60 simulated seconds. The 1 s cloud cadence would allow ~60
    // attempts; doubling delays (1,2,4,…,32 s) permit only a handful.
    for _ in 0..120 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }
    assert!(cloud.attempts >= 4, "backoff must keep retrying");
    assert!(
        cloud.attempts <= 8,
        "backoff must space retries out, got {}",
        cloud.attempts
    );
    assert!(sink.contains(|e| matches!(e, AppEvent::CloudBackoff { .. })));
}

#[test]
fn success_resets_backoff_and_reports_recovery() {
    let config = RoomConfig::default();
    let mut svc = service(&config);
    let mut hw = MockHardware::new();
    let mut cloud = MockCloud::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    // Establish a healthy link first, then lose it.
    for _ in 0..4 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }
    assert!(svc.online());
    cloud.online = false;
    for _ in 0..120 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }
    assert!(!svc.online());

    // Reconnect; the armed delay may reach 60 s, so run well past it.
    cloud.online = true;
    for _ in 0..200 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }
    assert!(svc.online());
    assert!(sink.contains(|e| matches!(e, AppEvent::CloudRecovered)));

    // Delay is back at the minimum: a fresh outage retries within ~1 s.
    let attempts_before = cloud.attempts;
    cloud.online = false;
    for _ in 0..4 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }
    assert!(cloud.attempts > attempts_before);
}

// ───────────────────────────────────────────────────────────────
// Live state keeps flowing when healthy
// ───────────────────────────────────────────────────────────────

#[test]
fn healthy_link_pushes_both_channels_live_state() {
    let config = RoomConfig::default();
    let mut svc = service(&config);
    let mut hw = MockHardware::new();
    let mut cloud = MockCloud::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    for _ in 0..8 {
        tick(&mut svc, &mut hw, &mut cloud, &clock, &mut sink);
    }

    let lighting = cloud
        .pushed_states
        .iter()
        .filter(|(c, _)| *c == ChannelId::Lighting)
        .count();
    let climate = cloud
        .pushed_states
        .iter()
        .filter(|(c, _)| *c == ChannelId::Climate)
        .count();
    assert!(lighting > 0);
    assert_eq!(lighting, climate);

    // Snapshots on a healthy link carry online = true (after the first
    // exchange has succeeded).
    let last = &cloud.pushed_states.last().unwrap().1;
    assert!(last.online);
}
