//! Unified error types for the room control core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be cheaply threaded through the tick path without allocation.
//!
//! Sensor trouble is deliberately *not* fatal anywhere: it is carried as a
//! [`FaultFlag`] that the controller consumes to pick a degraded policy.
//! The only fatal category is invalid configuration, rejected at startup.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor signal is degraded (stuck, flat, or invalid).
    Sensor(FaultFlag),
    /// A cloud/network operation failed; retried with backoff, never fatal.
    Comms(CommsError),
    /// Configuration is invalid. Fatal at startup — an inverted threshold
    /// pair would oscillate the actuators, so we refuse to run.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor fault flags
// ---------------------------------------------------------------------------

/// Per-signal fault classification.
///
/// Raised by the fault detectors in [`crate::signal::fault`] and consumed by
/// the hysteresis controller to select a degraded policy. A flag persists
/// until the signal resumes varying (or becomes fresh/valid again).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultFlag {
    /// Signal is healthy.
    #[default]
    None,
    /// Signal pinned near the bottom of its valid range.
    StuckLow,
    /// Signal pinned near the top of its valid range (or a digital input
    /// stuck asserted past its timeout).
    StuckHigh,
    /// Signal unchanged for longer than the flatline timeout, away from
    /// either rail.
    Flatline,
    /// Raw input was out of range / a sentinel, or a presence observation
    /// is stale.
    Invalid,
}

impl FaultFlag {
    /// True if this flag marks a degraded signal.
    pub fn is_fault(self) -> bool {
        self != Self::None
    }

    /// Wire name for snapshots (`sensorError` field); `None` for healthy.
    pub fn wire_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::StuckLow => Some("stuckLow"),
            Self::StuckHigh => Some("stuckHigh"),
            Self::Flatline => Some("flatline"),
            Self::Invalid => Some("invalid"),
        }
    }
}

impl fmt::Display for FaultFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "healthy"),
            Self::StuckLow => write!(f, "stuck low"),
            Self::StuckHigh => write!(f, "stuck high"),
            Self::Flatline => write!(f, "flatline"),
            Self::Invalid => write!(f, "invalid reading"),
        }
    }
}

impl From<FaultFlag> for Error {
    fn from(e: FaultFlag) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

/// Failures from the cloud boundary. All transient: the sync engine feeds
/// them into its backoff policy and local control continues unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The operation exceeded its bounded timeout.
    Timeout,
    /// The upstream endpoint could not be reached.
    Unreachable,
    /// The upstream rejected the write (non-2xx status or equivalent).
    Rejected,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::Rejected => write!(f, "write rejected"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
