//! Inbound manual commands.
//!
//! Polled from the cloud each sync tick (ordinary periodic pull — no
//! callbacks) and interpreted by the per-channel mode arbiter. Wire shape:
//!
//! ```json
//! { "mode": "manual", "actuator": { "on": true, "pwm": 180 } }
//! ```

use serde::Deserialize;

use crate::control::{ManualSetpoint, Mode};

/// One channel's manual command as read from the boundary.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ManualCommand {
    pub mode: Mode,
    /// Requested actuator state; only honored while `mode` is manual.
    #[serde(default)]
    pub actuator: Option<SetpointWire>,
}

/// Wire form of a manual setpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetpointWire {
    pub on: bool,
    pub pwm: u8,
}

impl ManualCommand {
    pub fn setpoint(&self) -> Option<ManualSetpoint> {
        self.actuator.map(|a| ManualSetpoint {
            on: a.on,
            level: a.pwm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command() {
        let cmd: ManualCommand =
            serde_json::from_str(r#"{"mode":"manual","actuator":{"on":true,"pwm":180}}"#).unwrap();
        assert_eq!(cmd.mode, Mode::Manual);
        let sp = cmd.setpoint().unwrap();
        assert!(sp.on);
        assert_eq!(sp.level, 180);
    }

    #[test]
    fn parses_mode_only_command() {
        let cmd: ManualCommand = serde_json::from_str(r#"{"mode":"auto"}"#).unwrap();
        assert_eq!(cmd.mode, Mode::Auto);
        assert!(cmd.setpoint().is_none());
    }
}
