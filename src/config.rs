//! System configuration parameters.
//!
//! All tunable parameters for the room control loop: band thresholds,
//! dwell and fault timeouts, level mapping, tick cadences, and cloud
//! backoff bounds. Values can be overridden via a JSON config file loaded
//! at startup; an invalid configuration is rejected there (fail fast —
//! an inverted threshold pair would oscillate the actuators).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capacity of the offline log ring buffer. Compile-time because the
/// buffer is a stack-allocated `heapless::Deque`; eviction policy and
/// bounds are covered in `cloud::buffer`.
pub const LOG_BUFFER_CAP: usize = 200;

/// Maximum number of hysteresis bands a channel may define.
pub const MAX_BANDS: usize = 4;

// ---------------------------------------------------------------------------
// Control bands
// ---------------------------------------------------------------------------

/// A named hysteresis zone.
///
/// Bands are ordered from least to most active. For every band above the
/// base one, `enter_high` is the rising threshold that admits the signal
/// into the band and `enter_low` is the falling threshold that drops it
/// back out; values in between hold the current band. The base band's pair
/// describes its nominal range and is only range-checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlBand {
    pub name: heapless::String<12>,
    pub enter_low: i32,
    pub enter_high: i32,
}

impl ControlBand {
    pub fn new(name: &str, enter_low: i32, enter_high: i32) -> Self {
        let mut n = heapless::String::new();
        let _ = n.push_str(&name[..name.len().min(12)]);
        Self {
            name: n,
            enter_low,
            enter_high,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-channel configuration
// ---------------------------------------------------------------------------

/// Monotonic mapping from the driving value's range onto 0–255,
/// quantized into `steps` observable levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelMapConfig {
    /// Driving value mapped to level 0.
    pub in_lo: i32,
    /// Driving value mapped to level 255.
    pub in_hi: i32,
    /// Number of discrete output steps (>= 2).
    pub steps: u8,
}

/// Stuck/flatline detection tuning for the channel's analog signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Changes of at most this magnitude count as "unchanged".
    pub epsilon: i32,
    /// Continuous no-change time before a flag is raised.
    pub flatline_secs: u16,
    /// Distance from a range rail within which a flat signal is
    /// classified StuckLow/StuckHigh instead of Flatline.
    pub rail_margin: i32,
}

/// Soft-start tuning for loads that cannot start at low duty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KickConfig {
    /// Targets below this level (and above zero) get a kick pulse when
    /// starting from rest. Zero disables the kick entirely.
    pub threshold: u8,
    /// Kick pulse duration at full duty.
    pub pulse_ms: u16,
}

/// Everything that parameterizes one instance of the generalized
/// control pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Hysteresis bands, least active first.
    pub bands: heapless::Vec<ControlBand, MAX_BANDS>,
    /// Minimum time in a band before another transition is accepted.
    pub dwell_secs: u16,
    /// Whether the presence signal gates activation (lighting-style).
    pub presence_gated: bool,
    /// Valid raw range; raw samples are clamped to it and sentinel
    /// values outside it are rejected.
    pub valid_min: i32,
    pub valid_max: i32,
    pub map: LevelMapConfig,
    pub fault: FaultConfig,
    pub kick: KickConfig,
}

// ---------------------------------------------------------------------------
// Shared inputs
// ---------------------------------------------------------------------------

/// Presence (occupancy) signal conditioning and freshness policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Continuous assertion required before presence is trusted.
    pub stable_ms: u32,
    /// Hold time after de-assertion (flicker suppression).
    pub cooldown_ms: u32,
    /// Presence observations older than this are stale and the signal is
    /// treated as faulted (`Invalid`).
    pub fresh_secs: u16,
    /// Presence stuck asserted past this raises `StuckHigh`.
    pub stuck_high_secs: u16,
}

/// Air-quality classification thresholds (raw sensor units).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HazardConfig {
    /// Readings at or below this are Good.
    pub good_max: i32,
    /// Readings at or below this (and above `good_max`) are Moderate;
    /// anything higher is Poor — the critical level that overrides the
    /// climate band.
    pub moderate_max: i32,
}

/// Independent cadences, all derived from the fast loop tick — never a
/// single shared blocking delay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sensor poll + control evaluation period.
    pub sensor_tick_ms: u32,
    /// Snapshot logging period.
    pub log_tick_ms: u32,
    /// Cloud push/poll period (subject to backoff on failure).
    pub cloud_tick_ms: u32,
}

/// Exponential backoff bounds for cloud retries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub min_ms: u32,
    pub max_ms: u32,
}

// ---------------------------------------------------------------------------
// Root configuration
// ---------------------------------------------------------------------------

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub lighting: ChannelConfig,
    pub climate: ChannelConfig,
    pub presence: PresenceConfig,
    pub air_quality: HazardConfig,
    pub timing: TimingConfig,
    pub backoff: BackoffConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            // LDR raw 0–4095, higher = darker. LED activates in the dark
            // band and dims proportionally to darkness.
            lighting: ChannelConfig {
                bands: heapless::Vec::from_slice(&[
                    ControlBand::new("bright", 0, 2800),
                    ControlBand::new("dark", 2800, 3200),
                ])
                .unwrap_or_default(),
                dwell_secs: 0,
                presence_gated: true,
                valid_min: 0,
                valid_max: 4095,
                map: LevelMapConfig {
                    in_lo: 2800,
                    in_hi: 4095,
                    steps: 16,
                },
                fault: FaultConfig {
                    epsilon: 8,
                    flatline_secs: 600,
                    rail_margin: 64,
                },
                // LEDs start fine at any duty.
                kick: KickConfig {
                    threshold: 0,
                    pulse_ms: 0,
                },
            },

            // Temperature in deci-degrees C. Fan speeds up through
            // low/moderate/high with a 60 s dwell against transients.
            climate: ChannelConfig {
                bands: heapless::Vec::from_slice(&[
                    ControlBand::new("low", 0, 235),
                    ControlBand::new("moderate", 235, 245),
                    ControlBand::new("high", 280, 290),
                ])
                .unwrap_or_default(),
                dwell_secs: 60,
                presence_gated: false,
                valid_min: -100,
                valid_max: 600,
                map: LevelMapConfig {
                    in_lo: 245,
                    in_hi: 320,
                    steps: 16,
                },
                fault: FaultConfig {
                    epsilon: 2,
                    flatline_secs: 600,
                    rail_margin: 10,
                },
                kick: KickConfig {
                    threshold: 102,
                    pulse_ms: 300,
                },
            },

            presence: PresenceConfig {
                stable_ms: 200,
                cooldown_ms: 2000,
                fresh_secs: 30,
                stuck_high_secs: 300,
            },

            // MQ-135 raw: Good 0–300, Moderate 301–400, Poor 401+.
            air_quality: HazardConfig {
                good_max: 300,
                moderate_max: 400,
            },

            timing: TimingConfig {
                sensor_tick_ms: 500,
                log_tick_ms: 2000,
                cloud_tick_ms: 1000,
            },

            backoff: BackoffConfig {
                min_ms: 1000,
                max_ms: 60_000,
            },
        }
    }
}

impl RoomConfig {
    /// Reject configurations that could oscillate or stall the loop.
    /// Called once at startup; any error here is fatal.
    pub fn validate(&self) -> Result<()> {
        validate_channel(&self.lighting)?;
        validate_channel(&self.climate)?;

        if self.timing.sensor_tick_ms == 0
            || self.timing.log_tick_ms == 0
            || self.timing.cloud_tick_ms == 0
        {
            return Err(Error::Config("tick intervals must be nonzero"));
        }
        if self.backoff.min_ms == 0 || self.backoff.min_ms > self.backoff.max_ms {
            return Err(Error::Config("backoff bounds inverted"));
        }
        if self.presence.stable_ms == 0 {
            return Err(Error::Config("presence stability window must be nonzero"));
        }
        if self.presence.fresh_secs == 0 || self.presence.stuck_high_secs == 0 {
            return Err(Error::Config("presence timeouts must be nonzero"));
        }
        if self.air_quality.good_max >= self.air_quality.moderate_max {
            return Err(Error::Config("air-quality thresholds inverted"));
        }
        Ok(())
    }
}

fn validate_channel(ch: &ChannelConfig) -> Result<()> {
    if ch.bands.is_empty() {
        return Err(Error::Config("channel has no bands"));
    }
    for band in &ch.bands {
        if band.enter_low >= band.enter_high {
            return Err(Error::Config("band enter_low must be below enter_high"));
        }
    }
    for pair in ch.bands.windows(2) {
        if pair[1].enter_high <= pair[0].enter_high || pair[1].enter_low < pair[0].enter_low {
            return Err(Error::Config("bands must be strictly ascending"));
        }
    }
    if ch.valid_min >= ch.valid_max {
        return Err(Error::Config("valid range inverted"));
    }
    if ch.map.in_lo >= ch.map.in_hi {
        return Err(Error::Config("level map range inverted"));
    }
    if ch.map.steps < 2 {
        return Err(Error::Config("level map needs at least 2 steps"));
    }
    if ch.fault.epsilon < 0 || ch.fault.rail_margin < 0 {
        return Err(Error::Config("fault margins must be non-negative"));
    }
    if ch.fault.flatline_secs == 0 {
        return Err(Error::Config("flatline timeout must be nonzero"));
    }
    Ok(())
}
