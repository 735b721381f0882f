//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, cloud, clock, event sinks,
//! config storage) implement these traits. The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! ## Boundary contract
//!
//! - **CloudPort** implementations MUST be non-blocking or bounded by a
//!   short timeout. A slow network returns [`CommsError::Timeout`]; it is
//!   never allowed to stall sensor polling or actuation.
//! - **ConfigPort** implementations MUST validate before persisting —
//!   invalid ranges are rejected, not silently clamped.

use crate::app::commands::ManualCommand;
use crate::app::events::{AppEvent, StateSnapshot};
use crate::config::RoomConfig;
use crate::control::{ActuatorCommand, ChannelId};
use crate::error::CommsError;
use crate::signal::PresenceObservation;

// ───────────────────────────────────────────────────────────────
// Clock (injected time source)
// ───────────────────────────────────────────────────────────────

/// Explicit time dependency so tests can supply deterministic time
/// without real delays.
pub trait Clock {
    /// Monotonic milliseconds since start. Drives all control timing.
    fn now_ms(&self) -> u64;

    /// Wall-clock epoch milliseconds, `None` until time is synced.
    fn epoch_ms(&self) -> Option<u64>;

    /// Snapshot timestamp: wall clock when available, monotonic fallback.
    fn timestamp_ms(&self) -> u64 {
        self.epoch_ms().unwrap_or_else(|| self.now_ms())
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One poll of every raw input. Failed reads are reported as the
/// [`INVALID_RAW`](crate::signal::INVALID_RAW) sentinel, never as an error
/// — a flaky sensor must not crash the control loop.
#[derive(Debug, Clone, Copy)]
pub struct RawReadings {
    /// LDR raw ADC counts (higher = darker).
    pub ldr_raw: i32,
    /// Temperature in deci-degrees Celsius.
    pub temp_dc: i32,
    /// Air-quality sensor raw counts.
    pub aq_raw: i32,
    /// Latest presence observation from the external detector.
    pub presence: PresenceObservation,
}

/// Read-side port: the domain calls this once per sensor tick.
pub trait SensorPort {
    fn read_raw(&mut self, now_ms: u64) -> RawReadings;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to execute commands. The
/// adapter applies the driver guardrails (clamping, soft-start kick,
/// idempotent re-apply).
pub trait ActuatorPort {
    fn set_light(&mut self, cmd: ActuatorCommand, now_ms: u64);

    fn set_fan(&mut self, cmd: ActuatorCommand, now_ms: u64);

    /// Kill both actuators — safe shutdown.
    fn all_off(&mut self, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Cloud port (driven adapter: domain ↔ upstream database)
// ───────────────────────────────────────────────────────────────

/// The upstream database, reduced to the three operations the loop
/// needs. All three are polled; every error is transient and feeds the
/// sync engine's backoff.
pub trait CloudPort {
    /// Overwrite the channel's live state document.
    fn push_state(&mut self, channel: ChannelId, snapshot: &StateSnapshot)
    -> Result<(), CommsError>;

    /// Append one log entry under its timestamp key.
    fn push_log(&mut self, channel: ChannelId, snapshot: &StateSnapshot)
    -> Result<(), CommsError>;

    /// Fetch the latest manual command for the channel, if any.
    fn poll_command(&mut self, channel: ChannelId) -> Result<Option<ManualCommand>, CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
pub trait ConfigPort {
    /// Load configuration from storage. Returns
    /// [`RoomConfig::default()`] if none exists.
    fn load(&self) -> Result<RoomConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &RoomConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
