//! Sensor fault detection.
//!
//! Watches conditioned signals over time and raises a [`FaultFlag`] when a
//! sensor stops behaving: pinned at a rail, flat away from the rails, or
//! feeding invalid/stale data. Flags clear on their own as soon as the
//! signal resumes varying.
//!
//! The detectors only *observe* — actuator state is never touched here.
//! The hysteresis controller consumes the flags to select a degraded
//! policy, and every snapshot carries the active flag until it clears.

use log::{error, info};

use crate::config::FaultConfig;
use crate::error::FaultFlag;
use crate::signal::SensorId;

// ---------------------------------------------------------------------------
// Analog signals
// ---------------------------------------------------------------------------

/// Flatline/stuck detector for one analog signal.
pub struct AnalogFaultDetector {
    id: SensorId,
    epsilon: i32,
    timeout_ms: u64,
    rail_margin: i32,
    valid_min: i32,
    valid_max: i32,
    last_value: Option<i32>,
    last_changed_at: u64,
    flag: FaultFlag,
}

impl AnalogFaultDetector {
    pub fn new(id: SensorId, cfg: &FaultConfig, valid_min: i32, valid_max: i32) -> Self {
        Self {
            id,
            epsilon: cfg.epsilon,
            timeout_ms: u64::from(cfg.flatline_secs) * 1000,
            rail_margin: cfg.rail_margin,
            valid_min,
            valid_max,
            last_value: None,
            last_changed_at: 0,
            flag: FaultFlag::None,
        }
    }

    /// Feed one conditioned value. Returns the current flag.
    pub fn observe(&mut self, value: i32, now_ms: u64) -> FaultFlag {
        match self.last_value {
            None => {
                self.last_value = Some(value);
                self.last_changed_at = now_ms;
                self.set_flag(FaultFlag::None);
            }
            Some(prev) if (value - prev).abs() > self.epsilon => {
                self.last_value = Some(value);
                self.last_changed_at = now_ms;
                self.set_flag(FaultFlag::None);
            }
            Some(_) => {
                if now_ms.saturating_sub(self.last_changed_at) > self.timeout_ms {
                    self.set_flag(self.classify(value));
                }
            }
        }
        self.flag
    }

    /// The conditioner rejected the raw sample (sentinel). Overrides any
    /// stuck classification until a valid sample arrives.
    pub fn mark_invalid(&mut self) -> FaultFlag {
        self.set_flag(FaultFlag::Invalid);
        // Force re-baseline so a recovering sensor clears promptly.
        self.last_value = None;
        self.flag
    }

    pub fn flag(&self) -> FaultFlag {
        self.flag
    }

    fn classify(&self, value: i32) -> FaultFlag {
        if value <= self.valid_min + self.rail_margin {
            FaultFlag::StuckLow
        } else if value >= self.valid_max - self.rail_margin {
            FaultFlag::StuckHigh
        } else {
            FaultFlag::Flatline
        }
    }

    fn set_flag(&mut self, flag: FaultFlag) {
        if flag == self.flag {
            return;
        }
        if flag.is_fault() {
            error!("FAULT SET: {} {}", self.id.label(), flag);
        } else {
            info!("FAULT CLEARED: {}", self.id.label());
        }
        self.flag = flag;
    }
}

// ---------------------------------------------------------------------------
// Digital presence signals
// ---------------------------------------------------------------------------

/// Stuck-high and staleness detector for the presence flag.
///
/// Staleness comes first: an observation older than the freshness window
/// means the upstream detector died, and the flag goes `Invalid` until a
/// fresh observation arrives.
pub struct PresenceFaultDetector {
    stuck_high_ms: u64,
    fresh_ms: u64,
    high_since: Option<u64>,
    flag: FaultFlag,
}

impl PresenceFaultDetector {
    pub fn new(stuck_high_secs: u16, fresh_secs: u16) -> Self {
        Self {
            stuck_high_ms: u64::from(stuck_high_secs) * 1000,
            fresh_ms: u64::from(fresh_secs) * 1000,
            high_since: None,
            flag: FaultFlag::None,
        }
    }

    /// Feed the raw (pre-debounce) flag and its observation timestamp.
    pub fn observe(&mut self, asserted: bool, observed_at_ms: u64, now_ms: u64) -> FaultFlag {
        if now_ms.saturating_sub(observed_at_ms) > self.fresh_ms {
            self.set_flag(FaultFlag::Invalid);
            self.high_since = None;
            return self.flag;
        }

        if asserted {
            let since = *self.high_since.get_or_insert(now_ms);
            if now_ms.saturating_sub(since) > self.stuck_high_ms {
                self.set_flag(FaultFlag::StuckHigh);
            } else if self.flag == FaultFlag::Invalid {
                self.set_flag(FaultFlag::None);
            }
        } else {
            self.high_since = None;
            self.set_flag(FaultFlag::None);
        }
        self.flag
    }

    pub fn flag(&self) -> FaultFlag {
        self.flag
    }

    fn set_flag(&mut self, flag: FaultFlag) {
        if flag == self.flag {
            return;
        }
        if flag.is_fault() {
            error!("FAULT SET: presence {}", flag);
        } else {
            info!("FAULT CLEARED: presence");
        }
        self.flag = flag;
    }
}
