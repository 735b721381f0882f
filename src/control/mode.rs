//! Auto/manual mode arbitration.
//!
//! The arbiter is the sole owner of the control mode. It is mutated only
//! by an explicit external command, never inferred from sensor data.
//!
//! Ordering invariant: when a mode change and a setpoint change arrive in
//! the same command, the mode is committed *first*, then the setpoint.
//! A partial update can therefore never leave the actuator obeying a stale
//! mode with a fresh setpoint or vice versa.

use serde::{Deserialize, Serialize};

use crate::control::ActuatorCommand;

/// Control mode. In `Manual` the hysteresis controller is bypassed
/// entirely and the stored setpoint drives the actuator directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

/// Operator-requested actuator state; meaningful only while `Mode::Manual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualSetpoint {
    pub on: bool,
    pub level: u8,
}

impl ManualSetpoint {
    fn as_command(self) -> ActuatorCommand {
        // `on = false` forces level 0 regardless of any stored level.
        ActuatorCommand::normalized(self.on, self.level)
    }
}

/// What an [`ModeArbiter::apply`] call actually changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbiterOutcome {
    /// `Some(new_mode)` if the mode switched.
    pub mode_changed: Option<Mode>,
    /// True if a setpoint was accepted (only possible in manual mode).
    pub setpoint_accepted: bool,
}

impl ArbiterOutcome {
    /// True if anything changed — such transitions are audit-logged.
    pub fn changed(self) -> bool {
        self.mode_changed.is_some() || self.setpoint_accepted
    }
}

pub struct ModeArbiter {
    mode: Mode,
    setpoint: ManualSetpoint,
}

impl ModeArbiter {
    pub fn new() -> Self {
        Self {
            mode: Mode::Auto,
            setpoint: ManualSetpoint::default(),
        }
    }

    /// Apply an external command atomically: mode first, then setpoint.
    ///
    /// A setpoint arriving while the (possibly just-committed) mode is
    /// `Auto` is dropped — setpoints are valid only in manual mode.
    pub fn apply(&mut self, mode: Mode, setpoint: Option<ManualSetpoint>) -> ArbiterOutcome {
        let mut outcome = ArbiterOutcome::default();

        if mode != self.mode {
            self.mode = mode;
            outcome.mode_changed = Some(mode);
        }

        if self.mode == Mode::Manual {
            if let Some(sp) = setpoint {
                let normalized = ManualSetpoint {
                    on: sp.on,
                    level: if sp.on { sp.level } else { 0 },
                };
                if normalized != self.setpoint || outcome.mode_changed.is_some() {
                    self.setpoint = normalized;
                    outcome.setpoint_accepted = true;
                }
            }
        }

        outcome
    }

    /// Resolve the tick's command: pass the automatic command through in
    /// auto mode, substitute the stored setpoint in manual mode.
    pub fn resolve(&self, auto_cmd: ActuatorCommand) -> ActuatorCommand {
        match self.mode {
            Mode::Auto => auto_cmd,
            Mode::Manual => self.setpoint.as_command(),
        }
    }

    /// The command manual mode would drive right now.
    pub fn manual_command(&self) -> ActuatorCommand {
        self.setpoint.as_command()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn setpoint(&self) -> ManualSetpoint {
        self.setpoint
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}
