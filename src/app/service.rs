//! Application service — the hexagonal core.
//!
//! [`AppService`] owns both control channels, the offline log buffer, and
//! the cloud sync engine. One call to [`AppService::tick`] performs, in
//! order: sensor polling → conditioning → fault check → mode/hysteresis
//! evaluation → actuation → (on coarser cadences) snapshot logging and
//! cloud drain.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! ActuatorPort ◀──│  lighting · climate · buffer │◀──▶ CloudPort
//!                 │        · cloud sync ·        │
//!                 └──────────────────────────────┘
//! ```
//!
//! The loop is single-threaded: the service is the sole owner of all
//! mutable state, and cloud failures surface as backoff, never as stalls.

use log::info;

use crate::app::commands::ManualCommand;
use crate::app::events::{AppEvent, StateSnapshot};
use crate::app::ports::{ActuatorPort, Clock, CloudPort, EventSink, SensorPort};
use crate::cloud::{CloudSync, LogBuffer};
use crate::config::{LOG_BUFFER_CAP, RoomConfig};
use crate::control::channel::{ChannelInputs, ControlChannel};
use crate::control::{ActuatorCommand, ChannelId};
use crate::error::Result;

pub struct AppService {
    lighting: ControlChannel,
    climate: ControlChannel,
    buffer: LogBuffer<LOG_BUFFER_CAP>,
    sync: CloudSync,
    log_tick_ms: u64,
    cloud_tick_ms: u64,
    next_log_at: u64,
    next_cloud_at: u64,
    tick_count: u64,
}

impl AppService {
    /// Construct the service. Rejects invalid configuration — this is the
    /// fail-fast point for inverted thresholds and zero cadences.
    pub fn new(config: &RoomConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lighting: ControlChannel::lighting(config),
            climate: ControlChannel::climate(config),
            buffer: LogBuffer::new(),
            sync: CloudSync::new(&config.backoff),
            log_tick_ms: u64::from(config.timing.log_tick_ms),
            cloud_tick_ms: u64::from(config.timing.cloud_tick_ms),
            next_log_at: 0,
            next_cloud_at: 0,
            tick_count: 0,
        })
    }

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!("room control loop starting");
        sink.emit(&AppEvent::Started);
    }

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        cloud: &mut impl CloudPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        let now = clock.now_ms();
        self.tick_count += 1;

        // 1. Poll sensors.
        let raw = hw.read_raw(now);

        // 2–4. Conditioning, fault check, mode/hysteresis — per channel.
        let light_cmd = run_channel(
            &mut self.lighting,
            &ChannelInputs {
                analog_raw: raw.ldr_raw,
                presence: Some(raw.presence),
                hazard_raw: None,
            },
            now,
            sink,
        );
        let fan_cmd = run_channel(
            &mut self.climate,
            &ChannelInputs {
                analog_raw: raw.temp_dc,
                presence: None,
                hazard_raw: Some(raw.aq_raw),
            },
            now,
            sink,
        );

        // 5. Actuate.
        hw.set_light(light_cmd, now);
        hw.set_fan(fan_cmd, now);

        // 6. Snapshot logging (coarser cadence).
        if now >= self.next_log_at {
            self.next_log_at = now + self.log_tick_ms;
            self.log_snapshots(clock);
        }

        // 7. Cloud push/poll (coarser cadence; backoff inside).
        if now >= self.next_cloud_at {
            self.next_cloud_at = now + self.cloud_tick_ms;
            self.cloud_cycle(cloud, clock, sink);
        }
    }

    // ── Observables (used by adapters and tests) ──────────────

    pub fn channel(&self, id: ChannelId) -> &ControlChannel {
        match id {
            ChannelId::Lighting => &self.lighting,
            ChannelId::Climate => &self.climate,
        }
    }

    pub fn buffer(&self) -> &LogBuffer<LOG_BUFFER_CAP> {
        &self.buffer
    }

    pub fn online(&self) -> bool {
        self.sync.online()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Build the current snapshot for one channel.
    pub fn snapshot(&self, id: ChannelId, clock: &impl Clock) -> StateSnapshot {
        snapshot_of(self.channel(id), self.sync.online(), clock.timestamp_ms())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn log_snapshots(&mut self, clock: &impl Clock) {
        let ts = clock.timestamp_ms();
        let online = self.sync.online();
        let light = snapshot_of(&self.lighting, online, ts);
        let fan = snapshot_of(&self.climate, online, ts);
        self.buffer.push(ChannelId::Lighting, light);
        self.buffer.push(ChannelId::Climate, fan);
    }

    fn cloud_cycle(
        &mut self,
        cloud: &mut impl CloudPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        let ts = clock.timestamp_ms();
        let online = self.sync.online();
        let live_light = snapshot_of(&self.lighting, online, ts);
        let live_fan = snapshot_of(&self.climate, online, ts);

        let polled = self
            .sync
            .tick(cloud, &mut self.buffer, &live_light, &live_fan, clock.now_ms(), sink);

        if let Some(cmd) = polled.lighting {
            self.apply_command(ChannelId::Lighting, &cmd, clock, sink);
        }
        if let Some(cmd) = polled.climate {
            self.apply_command(ChannelId::Climate, &cmd, clock, sink);
        }
    }

    /// Apply a polled manual command. Mode commits before setpoint (the
    /// arbiter's invariant); every accepted change is audit-logged with
    /// an immediate snapshot.
    fn apply_command(
        &mut self,
        id: ChannelId,
        cmd: &ManualCommand,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        let outcome = match id {
            ChannelId::Lighting => self.lighting.handle_command(cmd.mode, cmd.setpoint()),
            ChannelId::Climate => self.climate.handle_command(cmd.mode, cmd.setpoint()),
        };

        if let Some(mode) = outcome.mode_changed {
            info!("{}: mode -> {:?}", id.label(), mode);
            sink.emit(&AppEvent::ModeChanged { channel: id, mode });
        }

        if outcome.changed() {
            let snap = snapshot_of(self.channel(id), self.sync.online(), clock.timestamp_ms());
            self.buffer.push(id, snap);
        }
    }
}

/// One channel evaluation plus band/fault change events.
fn run_channel(
    ch: &mut ControlChannel,
    inputs: &ChannelInputs,
    now_ms: u64,
    sink: &mut impl EventSink,
) -> ActuatorCommand {
    let prev_band_idx = ch.band_index();
    let prev_band = hstring(ch.band_name());
    let prev_fault = ch.active_fault();

    let cmd = ch.tick(inputs, now_ms);

    if ch.band_index() != prev_band_idx {
        sink.emit(&AppEvent::BandChanged {
            channel: ch.id(),
            from: prev_band,
            to: hstring(ch.band_name()),
        });
    }

    let fault = ch.active_fault();
    if fault != prev_fault {
        if fault.is_fault() {
            sink.emit(&AppEvent::FaultRaised {
                channel: ch.id(),
                flag: fault,
            });
        } else {
            sink.emit(&AppEvent::FaultCleared { channel: ch.id() });
        }
    }

    cmd
}

fn snapshot_of(ch: &ControlChannel, online: bool, ts: u64) -> StateSnapshot {
    StateSnapshot {
        ts,
        mode: ch.mode(),
        signal: ch.conditioned_value(),
        actuator: ch.last_command(),
        band: hstring(ch.band_name()),
        sensor_error: ch.active_fault().wire_name(),
        presence: ch.presence(),
        aq_status: (ch.id() == ChannelId::Climate).then(|| ch.hazard().wire_name()),
        online,
    }
}

fn hstring(s: &str) -> heapless::String<12> {
    let mut out = heapless::String::new();
    let _ = out.push_str(&s[..s.len().min(12)]);
    out
}
