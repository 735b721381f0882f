//! Simulated hardware adapter.
//!
//! Bridges the port traits to in-memory peripherals: injectable raw
//! sensor values on the read side, two guardrail PWM drivers on the write
//! side. Standalone host runs and integration tests both use it; a real
//! deployment swaps in an adapter whose [`SetDutyCycle`] outputs are LEDC
//! channels and whose reads hit the ADC.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::app::ports::{ActuatorPort, RawReadings, SensorPort};
use crate::config::RoomConfig;
use crate::control::ActuatorCommand;
use crate::drivers::PwmActuator;
use crate::signal::PresenceObservation;

// ── In-memory PWM peripheral ─────────────────────────────────

/// PWM output that just remembers its duty (0–255 scale).
pub struct SimPwm {
    duty: u16,
}

impl SimPwm {
    pub fn new() -> Self {
        Self { duty: 0 }
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl Default for SimPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty.min(255);
        Ok(())
    }
}

// ── Simulated hardware ───────────────────────────────────────

pub struct SimHardware {
    ldr_raw: i32,
    temp_dc: i32,
    aq_raw: i32,
    presence: PresenceObservation,
    led: PwmActuator<SimPwm>,
    fan: PwmActuator<SimPwm>,
}

impl SimHardware {
    pub fn new(cfg: &RoomConfig) -> Self {
        Self {
            // Bright, cool, clean, empty room.
            ldr_raw: 1500,
            temp_dc: 220,
            aq_raw: 150,
            presence: PresenceObservation {
                asserted: false,
                observed_at_ms: 0,
            },
            led: PwmActuator::new(SimPwm::new(), &cfg.lighting.kick, "led"),
            fan: PwmActuator::new(SimPwm::new(), &cfg.climate.kick, "fan"),
        }
    }

    // ── Injection (simulation inputs) ─────────────────────────

    pub fn set_ldr(&mut self, raw: i32) {
        self.ldr_raw = raw;
    }

    pub fn set_temp_dc(&mut self, deci_celsius: i32) {
        self.temp_dc = deci_celsius;
    }

    pub fn set_aq(&mut self, raw: i32) {
        self.aq_raw = raw;
    }

    pub fn set_presence(&mut self, asserted: bool, observed_at_ms: u64) {
        self.presence = PresenceObservation {
            asserted,
            observed_at_ms,
        };
    }

    // ── Observation (simulation outputs) ──────────────────────

    /// Duty currently on the LED wire (kick pulses included).
    pub fn led_level(&self) -> u8 {
        self.led.hw_level()
    }

    pub fn fan_level(&self) -> u8 {
        self.fan.hw_level()
    }

    pub fn led_command(&self) -> Option<ActuatorCommand> {
        self.led.applied()
    }

    pub fn fan_command(&self) -> Option<ActuatorCommand> {
        self.fan.applied()
    }

    pub fn fan_is_kicking(&self) -> bool {
        self.fan.is_kicking()
    }
}

impl SensorPort for SimHardware {
    fn read_raw(&mut self, _now_ms: u64) -> RawReadings {
        RawReadings {
            ldr_raw: self.ldr_raw,
            temp_dc: self.temp_dc,
            aq_raw: self.aq_raw,
            presence: self.presence,
        }
    }
}

impl ActuatorPort for SimHardware {
    fn set_light(&mut self, cmd: ActuatorCommand, now_ms: u64) {
        match self.led.apply(cmd, now_ms) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn set_fan(&mut self, cmd: ActuatorCommand, now_ms: u64) {
        match self.fan.apply(cmd, now_ms) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn all_off(&mut self, now_ms: u64) {
        self.set_light(ActuatorCommand::off(), now_ms);
        self.set_fan(ActuatorCommand::off(), now_ms);
    }
}
