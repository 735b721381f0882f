//! Mock adapters for integration tests.
//!
//! Record every actuator call and cloud operation so tests can assert on
//! full histories without touching real peripherals or the network.

use roomctl::app::commands::ManualCommand;
use roomctl::app::events::{AppEvent, StateSnapshot};
use roomctl::app::ports::{ActuatorPort, CloudPort, EventSink, RawReadings, SensorPort};
use roomctl::control::{ActuatorCommand, ChannelId};
use roomctl::CommsError;
use roomctl::signal::PresenceObservation;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Light(ActuatorCommand),
    Fan(ActuatorCommand),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub ldr_raw: i32,
    pub temp_dc: i32,
    pub aq_raw: i32,
    pub presence: PresenceObservation,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            ldr_raw: 1500,
            temp_dc: 220,
            aq_raw: 150,
            presence: PresenceObservation {
                asserted: false,
                observed_at_ms: 0,
            },
        }
    }

    pub fn set_presence(&mut self, asserted: bool, observed_at_ms: u64) {
        self.presence = PresenceObservation {
            asserted,
            observed_at_ms,
        };
    }

    pub fn last_light(&self) -> Option<ActuatorCommand> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Light(cmd) => Some(*cmd),
            ActuatorCall::AllOff => Some(ActuatorCommand::off()),
            ActuatorCall::Fan(_) => None,
        })
    }

    pub fn last_fan(&self) -> Option<ActuatorCommand> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Fan(cmd) => Some(*cmd),
            ActuatorCall::AllOff => Some(ActuatorCommand::off()),
            ActuatorCall::Light(_) => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_raw(&mut self, _now_ms: u64) -> RawReadings {
        RawReadings {
            ldr_raw: self.ldr_raw,
            temp_dc: self.temp_dc,
            aq_raw: self.aq_raw,
            presence: self.presence,
        }
    }
}

impl ActuatorPort for MockHardware {
    fn set_light(&mut self, cmd: ActuatorCommand, _now_ms: u64) {
        self.calls.push(ActuatorCall::Light(cmd));
    }

    fn set_fan(&mut self, cmd: ActuatorCommand, _now_ms: u64) {
        self.calls.push(ActuatorCall::Fan(cmd));
    }

    fn all_off(&mut self, _now_ms: u64) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── MockCloud ─────────────────────────────────────────────────

pub struct MockCloud {
    /// Toggle to simulate connectivity loss; every operation fails while
    /// false.
    pub online: bool,
    pub pushed_states: Vec<(ChannelId, StateSnapshot)>,
    /// (channel, ts) keys of delivered log entries.
    pub pushed_logs: Vec<(ChannelId, u64)>,
    /// Number of operations attempted (including failures) — observable
    /// effect of the backoff policy.
    pub attempts: u32,
    pub next_lighting_cmd: Option<ManualCommand>,
    pub next_climate_cmd: Option<ManualCommand>,
}

#[allow(dead_code)]
impl MockCloud {
    pub fn new() -> Self {
        Self {
            online: true,
            pushed_states: Vec::new(),
            pushed_logs: Vec::new(),
            attempts: 0,
            next_lighting_cmd: None,
            next_climate_cmd: None,
        }
    }

    pub fn offline() -> Self {
        let mut c = Self::new();
        c.online = false;
        c
    }

    pub fn queue_command(&mut self, channel: ChannelId, cmd: ManualCommand) {
        match channel {
            ChannelId::Lighting => self.next_lighting_cmd = Some(cmd),
            ChannelId::Climate => self.next_climate_cmd = Some(cmd),
        }
    }

    fn check(&mut self) -> Result<(), CommsError> {
        self.attempts += 1;
        if self.online {
            Ok(())
        } else {
            Err(CommsError::Unreachable)
        }
    }
}

impl Default for MockCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudPort for MockCloud {
    fn push_state(
        &mut self,
        channel: ChannelId,
        snapshot: &StateSnapshot,
    ) -> Result<(), CommsError> {
        self.check()?;
        self.pushed_states.push((channel, snapshot.clone()));
        Ok(())
    }

    fn push_log(&mut self, channel: ChannelId, snapshot: &StateSnapshot) -> Result<(), CommsError> {
        self.check()?;
        self.pushed_logs.push((channel, snapshot.ts));
        Ok(())
    }

    fn poll_command(&mut self, channel: ChannelId) -> Result<Option<ManualCommand>, CommsError> {
        self.check()?;
        Ok(match channel {
            ChannelId::Lighting => self.next_lighting_cmd.take(),
            ChannelId::Climate => self.next_climate_cmd.take(),
        })
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, pred: impl Fn(&AppEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
