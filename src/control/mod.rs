//! Control core — the generalized sensor-to-actuator pipeline.
//!
//! One implementation of the mode/hysteresis/fault policy, expressed as
//! `DrivingSignal -> ActuatorCommand`, instantiated per channel with
//! different threshold and mapping configuration:
//!
//! ```text
//!  conditioned value ─┐
//!  presence (gated)  ─┤   ┌──────────────┐    ┌────────────────────┐
//!  hazard level      ─┼──▶│  ModeArbiter │───▶│ HysteresisController│──▶ ActuatorCommand
//!  fault flags       ─┘   │ (auto/manual)│    │ (bands + level map) │
//!                         └──────────────┘    └────────────────────┘
//! ```

pub mod channel;
pub mod hysteresis;
pub mod mode;

pub use channel::{ChannelInputs, ControlChannel};
pub use hysteresis::{HysteresisController, LevelMap};
pub use mode::{ManualSetpoint, Mode, ModeArbiter};

use serde::{Deserialize, Serialize};

use crate::config::HazardConfig;
use crate::error::FaultFlag;

// ---------------------------------------------------------------------------
// Channel identity
// ---------------------------------------------------------------------------

/// Which actuator a channel drives. Used for cloud paths and event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    /// Dimmable LED driven by darkness + presence.
    Lighting,
    /// Variable-speed fan driven by temperature + air-quality hazard.
    Climate,
}

impl ChannelId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lighting => "lighting",
            Self::Climate => "climate",
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator command
// ---------------------------------------------------------------------------

/// The command handed to the actuator driver each tick.
///
/// Invariant: `on == false` implies `level == 0`. Constructors uphold it;
/// the driver re-clamps defensively on apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub on: bool,
    #[serde(rename = "pwm")]
    pub level: u8,
}

impl ActuatorCommand {
    /// Actuator off.
    pub const fn off() -> Self {
        Self { on: false, level: 0 }
    }

    /// Actuator on at `level`.
    pub const fn active(level: u8) -> Self {
        Self { on: true, level }
    }

    /// Build from untrusted parts, restoring the invariant.
    pub fn normalized(on: bool, level: u8) -> Self {
        if on { Self::active(level) } else { Self::off() }
    }
}

impl Default for ActuatorCommand {
    fn default() -> Self {
        Self::off()
    }
}

// ---------------------------------------------------------------------------
// Hazard classification
// ---------------------------------------------------------------------------

/// Air-quality classification. `Poor` is the critical level that overrides
/// the climate band to full activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HazardLevel {
    #[default]
    Good,
    Moderate,
    Poor,
}

impl HazardLevel {
    pub fn classify(raw: i32, cfg: &HazardConfig) -> Self {
        if raw > cfg.moderate_max {
            Self::Poor
        } else if raw > cfg.good_max {
            Self::Moderate
        } else {
            Self::Good
        }
    }

    pub fn is_critical(self) -> bool {
        self == Self::Poor
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
        }
    }
}

// ---------------------------------------------------------------------------
// Driving signal
// ---------------------------------------------------------------------------

/// Everything the hysteresis controller consumes on one tick.
#[derive(Debug, Clone, Copy)]
pub struct DrivingSignal {
    /// Conditioned analog value.
    pub value: i32,
    /// False while the conditioner has produced no output yet; suppresses
    /// band transitions for the tick.
    pub stable: bool,
    /// Debounced presence, `None` for channels without a presence input.
    pub presence: Option<bool>,
    /// Critical hazard forces maximum activation.
    pub hazard_critical: bool,
    pub analog_fault: FaultFlag,
    pub presence_fault: FaultFlag,
}
