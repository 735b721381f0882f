//! Two-threshold hysteresis band machine with numeric level mapping.
//!
//! ```text
//!          value ≥ enter_high(next)          value ≥ enter_high(next)
//!   ┌────┐ ─────────────────────▶ ┌────────┐ ─────────────────────▶ ┌────┐
//!   │band│                        │ band   │                        │band│
//!   │ 0  │ ◀───────────────────── │ 1      │ ◀───────────────────── │ 2  │
//!   └────┘  value < enter_low(1)  └────────┘  value < enter_low(2)  └────┘
//! ```
//!
//! Values between a band's `enter_low` and the next band's `enter_high`
//! hold the current band — the anti-oscillation invariant. A configured
//! dwell time additionally pins the band against transients; the hazard
//! override and a lost presence gate both bypass the dwell.
//!
//! Degraded policies when a sensor is flagged:
//! - analog faulted → drive from the presence signal alone at a fixed
//!   mid level (channels without presence fall back to the mid level
//!   outright, keeping air moving);
//! - presence faulted → drive from the analog signal alone (gate ignored);
//! - hazard critical → most-active band at full level, unconditionally.

use log::info;

use crate::config::{ChannelConfig, ControlBand, LevelMapConfig, MAX_BANDS};
use crate::control::{ActuatorCommand, DrivingSignal};

/// Fixed command level for degraded single-input operation.
pub const MID_LEVEL: u8 = 128;

// ---------------------------------------------------------------------------
// Level mapping
// ---------------------------------------------------------------------------

/// Deterministic monotonic map from the driving range onto 0–255,
/// quantized into a small number of observable steps.
#[derive(Debug, Clone, Copy)]
pub struct LevelMap {
    in_lo: i32,
    in_hi: i32,
    steps: u8,
}

impl LevelMap {
    pub fn new(cfg: &LevelMapConfig) -> Self {
        Self {
            in_lo: cfg.in_lo,
            in_hi: cfg.in_hi,
            steps: cfg.steps.max(2),
        }
    }

    pub fn level(&self, value: i32) -> u8 {
        let v = value.clamp(self.in_lo, self.in_hi);
        let span = i64::from(self.in_hi) - i64::from(self.in_lo);
        let raw = (i64::from(v) - i64::from(self.in_lo)) * 255 / span;
        self.quantize(raw as u16)
    }

    fn quantize(&self, raw: u16) -> u8 {
        let q = (255 / (u16::from(self.steps) - 1)).max(1);
        (((raw + q / 2) / q) * q).min(255) as u8
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct HysteresisController {
    bands: heapless::Vec<ControlBand, MAX_BANDS>,
    presence_gated: bool,
    dwell_ms: u64,
    map: LevelMap,
    current: usize,
    entered_at: u64,
    started: bool,
}

impl HysteresisController {
    /// Build from a validated channel configuration (see
    /// [`RoomConfig::validate`](crate::config::RoomConfig::validate)).
    pub fn new(cfg: &ChannelConfig) -> Self {
        Self {
            bands: cfg.bands.clone(),
            presence_gated: cfg.presence_gated,
            dwell_ms: u64::from(cfg.dwell_secs) * 1000,
            map: LevelMap::new(&cfg.map),
            current: 0,
            entered_at: 0,
            started: false,
        }
    }

    /// One evaluation: update the band and return the actuator command.
    pub fn evaluate(&mut self, sig: &DrivingSignal, now_ms: u64) -> ActuatorCommand {
        // Hazard override beats everything, including dwell and faults.
        if sig.hazard_critical {
            self.enter(self.bands.len() - 1, now_ms);
            return ActuatorCommand::active(255);
        }

        if sig.analog_fault.is_fault() {
            return self.degraded(sig, now_ms);
        }

        // No conditioned output yet — hold, do not transition.
        if !sig.stable {
            return self.command_for_current(sig.value);
        }

        // A faulted presence signal drops the gate: analog-only policy.
        let presence = if sig.presence_fault.is_fault() {
            None
        } else {
            sig.presence
        };

        // Absence forces the base band within one tick, dwell or not.
        if self.presence_gated && presence == Some(false) {
            self.enter(0, now_ms);
            return ActuatorCommand::off();
        }

        if self.dwell_elapsed(now_ms) {
            let mut target = self.current;
            while target + 1 < self.bands.len() && sig.value >= self.bands[target + 1].enter_high
            {
                target += 1;
            }
            if target == self.current {
                while target > 0 && sig.value < self.bands[target].enter_low {
                    target -= 1;
                }
            }
            if target != self.current {
                self.enter(target, now_ms);
            }
        }

        self.command_for_current(sig.value)
    }

    /// Name of the current band (for snapshots and events).
    pub fn band_name(&self) -> &str {
        &self.bands[self.current].name
    }

    pub fn band_index(&self) -> usize {
        self.current
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn degraded(&mut self, sig: &DrivingSignal, now_ms: u64) -> ActuatorCommand {
        if self.presence_gated {
            // Presence-only policy. If presence is faulted too, everything
            // we could trust is gone — off is the only safe command.
            let active = !sig.presence_fault.is_fault() && sig.presence == Some(true);
            if active {
                self.enter(self.bands.len() - 1, now_ms);
                ActuatorCommand::active(MID_LEVEL)
            } else {
                self.enter(0, now_ms);
                ActuatorCommand::off()
            }
        } else {
            // No presence input to fall back on: fixed mid-level output.
            self.enter(self.bands.len() / 2, now_ms);
            ActuatorCommand::active(MID_LEVEL)
        }
    }

    fn command_for_current(&self, value: i32) -> ActuatorCommand {
        if self.current == 0 {
            ActuatorCommand::off()
        } else {
            ActuatorCommand::active(self.map.level(value))
        }
    }

    fn dwell_elapsed(&self, now_ms: u64) -> bool {
        self.dwell_ms == 0
            || !self.started
            || now_ms.saturating_sub(self.entered_at) >= self.dwell_ms
    }

    fn enter(&mut self, idx: usize, now_ms: u64) {
        if self.started && idx == self.current {
            return;
        }
        if self.started {
            info!(
                "band: {} -> {}",
                self.bands[self.current].name, self.bands[idx].name
            );
        }
        self.current = idx;
        self.entered_at = now_ms;
        self.started = true;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
