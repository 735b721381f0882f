//! One instance of the generalized control pipeline.
//!
//! A [`ControlChannel`] owns the full per-actuator chain — median filter,
//! fault detectors, optional presence debounce, optional hazard
//! classification, mode arbiter, and the hysteresis controller — and is
//! instantiated twice with different configuration: once for lighting,
//! once for climate. The channel exposes its observable state through
//! accessors; the application service assembles snapshots from them.

use crate::config::{HazardConfig, RoomConfig};
use crate::control::hysteresis::HysteresisController;
use crate::control::mode::{ArbiterOutcome, ManualSetpoint, Mode, ModeArbiter};
use crate::control::{ActuatorCommand, ChannelId, DrivingSignal, HazardLevel};
use crate::error::FaultFlag;
use crate::signal::fault::{AnalogFaultDetector, PresenceFaultDetector};
use crate::signal::{ConditionedSample, Debouncer, MedianFilter, PresenceObservation, SensorId};

/// Raw inputs for one channel tick, as polled from the sensor port.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelInputs {
    pub analog_raw: i32,
    /// Presence observation; `None` for channels without a presence input.
    pub presence: Option<PresenceObservation>,
    /// Auxiliary hazard sensor raw value (air quality), if wired.
    pub hazard_raw: Option<i32>,
}

pub struct ControlChannel {
    id: ChannelId,
    filter: MedianFilter,
    analog_fault: AnalogFaultDetector,
    debounce: Option<Debouncer>,
    presence_fault: Option<PresenceFaultDetector>,
    hazard_filter: Option<MedianFilter>,
    hazard_cfg: HazardConfig,
    arbiter: ModeArbiter,
    ctrl: HysteresisController,

    // Latest observables, refreshed each tick.
    conditioned: ConditionedSample,
    presence_high: bool,
    hazard: HazardLevel,
    last_cmd: ActuatorCommand,
}

impl ControlChannel {
    /// Lighting: LDR + debounced, freshness-checked presence gate.
    pub fn lighting(cfg: &RoomConfig) -> Self {
        let ch = &cfg.lighting;
        Self {
            id: ChannelId::Lighting,
            filter: MedianFilter::new(ch.valid_min, ch.valid_max),
            analog_fault: AnalogFaultDetector::new(
                SensorId::Ldr,
                &ch.fault,
                ch.valid_min,
                ch.valid_max,
            ),
            debounce: Some(Debouncer::new(
                cfg.presence.stable_ms,
                cfg.presence.cooldown_ms,
            )),
            presence_fault: Some(PresenceFaultDetector::new(
                cfg.presence.stuck_high_secs,
                cfg.presence.fresh_secs,
            )),
            hazard_filter: None,
            hazard_cfg: cfg.air_quality,
            arbiter: ModeArbiter::new(),
            ctrl: HysteresisController::new(ch),
            conditioned: ConditionedSample {
                value: 0,
                stable: false,
            },
            presence_high: false,
            hazard: HazardLevel::Good,
            last_cmd: ActuatorCommand::off(),
        }
    }

    /// Climate: temperature + air-quality hazard override, no presence.
    pub fn climate(cfg: &RoomConfig) -> Self {
        let ch = &cfg.climate;
        Self {
            id: ChannelId::Climate,
            filter: MedianFilter::new(ch.valid_min, ch.valid_max),
            analog_fault: AnalogFaultDetector::new(
                SensorId::Temperature,
                &ch.fault,
                ch.valid_min,
                ch.valid_max,
            ),
            debounce: None,
            presence_fault: None,
            hazard_filter: Some(MedianFilter::new(0, 4095)),
            hazard_cfg: cfg.air_quality,
            arbiter: ModeArbiter::new(),
            ctrl: HysteresisController::new(ch),
            conditioned: ConditionedSample {
                value: 0,
                stable: false,
            },
            presence_high: false,
            hazard: HazardLevel::Good,
            last_cmd: ActuatorCommand::off(),
        }
    }

    /// Run one control evaluation: condition → fault check → arbitrate →
    /// hysteresis (auto) or stored setpoint (manual).
    pub fn tick(&mut self, inp: &ChannelInputs, now_ms: u64) -> ActuatorCommand {
        // 1. Analog conditioning + fault observation.
        self.conditioned = self.filter.update(inp.analog_raw);
        let analog_flag = if self.filter.rejected_last() {
            self.analog_fault.mark_invalid()
        } else {
            self.analog_fault.observe(self.conditioned.value, now_ms)
        };

        // 2. Presence conditioning (lighting only).
        let mut presence = None;
        let mut presence_flag = FaultFlag::None;
        if let (Some(debounce), Some(detector)) = (&mut self.debounce, &mut self.presence_fault) {
            let obs = inp.presence.unwrap_or(PresenceObservation {
                asserted: false,
                observed_at_ms: 0,
            });
            presence_flag = detector.observe(obs.asserted, obs.observed_at_ms, now_ms);
            self.presence_high = debounce.update(obs.asserted, now_ms);
            presence = Some(self.presence_high);
        }

        // 3. Hazard classification (climate only).
        if let Some(f) = &mut self.hazard_filter {
            if let Some(raw) = inp.hazard_raw {
                let aq = f.update(raw);
                self.hazard = HazardLevel::classify(aq.value, &self.hazard_cfg);
            }
        }

        // 4. Mode arbitration. Manual bypasses the controller entirely.
        let cmd = match self.arbiter.mode() {
            Mode::Manual => self.arbiter.manual_command(),
            Mode::Auto => {
                let sig = DrivingSignal {
                    value: self.conditioned.value,
                    stable: self.conditioned.stable,
                    presence,
                    hazard_critical: self.hazard.is_critical(),
                    analog_fault: analog_flag,
                    presence_fault: presence_flag,
                };
                self.ctrl.evaluate(&sig, now_ms)
            }
        };

        self.last_cmd = cmd;
        cmd
    }

    /// Apply an inbound manual command (mode first, then setpoint).
    pub fn handle_command(&mut self, mode: Mode, setpoint: Option<ManualSetpoint>) -> ArbiterOutcome {
        self.arbiter.apply(mode, setpoint)
    }

    // ── Observables ───────────────────────────────────────────

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.arbiter.mode()
    }

    pub fn band_name(&self) -> &str {
        self.ctrl.band_name()
    }

    pub fn band_index(&self) -> usize {
        self.ctrl.band_index()
    }

    pub fn conditioned_value(&self) -> i32 {
        self.conditioned.value
    }

    pub fn presence(&self) -> bool {
        self.presence_high
    }

    pub fn hazard(&self) -> HazardLevel {
        self.hazard
    }

    pub fn last_command(&self) -> ActuatorCommand {
        self.last_cmd
    }

    /// The fault reported in snapshots: the analog flag wins, then the
    /// presence flag.
    pub fn active_fault(&self) -> FaultFlag {
        let analog = self.analog_fault.flag();
        if analog.is_fault() {
            return analog;
        }
        self.presence_fault
            .as_ref()
            .map_or(FaultFlag::None, PresenceFaultDetector::flag)
    }
}
