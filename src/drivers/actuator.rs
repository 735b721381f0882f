//! Guardrail PWM actuator driver.
//!
//! Wraps any [`SetDutyCycle`] output (LEDC channel, hardware timer, or the
//! in-memory simulation) behind the command contract:
//!
//! - `level` is clamped to 0–255 and forced to 0 whenever `on == false`;
//! - re-applying an identical command performs no hardware write;
//! - a transition from rest to a weak target (below the stall threshold)
//!   first drives full duty for a short kick pulse, then settles — fans
//!   cannot reliably start at low duty.
//!
//! The driver is deliberately dumb: it never decides *whether* to run,
//! only *how* to execute the command it was given.

use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::config::KickConfig;
use crate::control::ActuatorCommand;

pub struct PwmActuator<P: SetDutyCycle> {
    pwm: P,
    label: &'static str,
    kick_threshold: u8,
    kick_pulse_ms: u64,
    /// Last command accepted (post-normalization).
    applied: Option<ActuatorCommand>,
    /// Deadline of an in-flight kick pulse.
    kick_until: Option<u64>,
    /// Duty currently on the wire (kick included), 0–255 scale.
    hw_level: u8,
}

impl<P: SetDutyCycle> PwmActuator<P> {
    pub fn new(pwm: P, cfg: &KickConfig, label: &'static str) -> Self {
        Self {
            pwm,
            label,
            kick_threshold: cfg.threshold,
            kick_pulse_ms: u64::from(cfg.pulse_ms),
            applied: None,
            kick_until: None,
            hw_level: 0,
        }
    }

    /// Execute a command. Idempotent at the hardware level.
    pub fn apply(&mut self, cmd: ActuatorCommand, now_ms: u64) -> Result<(), P::Error> {
        let cmd = ActuatorCommand::normalized(cmd.on, cmd.level);

        if self.applied == Some(cmd) {
            // Unchanged command — the only pending work is settling an
            // expired kick pulse down to its target.
            if let Some(until) = self.kick_until {
                if now_ms >= until {
                    self.kick_until = None;
                    self.write(cmd.level)?;
                    debug!("{}: kick settled at {}", self.label, cmd.level);
                }
            }
            return Ok(());
        }

        let from_rest = self.applied.is_none_or(|prev| prev.level == 0);
        let needs_kick = cmd.on
            && cmd.level > 0
            && cmd.level < self.kick_threshold
            && from_rest
            && self.kick_pulse_ms > 0;

        if needs_kick {
            self.kick_until = Some(now_ms + self.kick_pulse_ms);
            self.write(255)?;
            debug!("{}: kick pulse, target {}", self.label, cmd.level);
        } else {
            self.kick_until = None;
            self.write(cmd.level)?;
        }
        self.applied = Some(cmd);
        Ok(())
    }

    /// Duty currently on the wire (255 during a kick pulse).
    pub fn hw_level(&self) -> u8 {
        self.hw_level
    }

    /// Last accepted command, if any.
    pub fn applied(&self) -> Option<ActuatorCommand> {
        self.applied
    }

    pub fn is_kicking(&self) -> bool {
        self.kick_until.is_some()
    }

    fn write(&mut self, level: u8) -> Result<(), P::Error> {
        self.pwm.set_duty_cycle_fraction(u16::from(level), 255)?;
        self.hw_level = level;
        Ok(())
    }
}
