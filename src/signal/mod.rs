//! Signal conditioning — cleans raw sensor input before control logic
//! sees it.
//!
//! Analog inputs go through a fixed-window [`MedianFilter`]; digital
//! presence-like inputs go through a [`Debouncer`] with a stability window
//! and a de-assertion cooldown. The [`fault`] detectors watch conditioned
//! signals over time and flag stuck/flat/invalid sensors.
//!
//! Contract: conditioning never panics and never raises an error — invalid
//! raw input degrades to "hold the last good value" and is surfaced as a
//! fault flag instead.

pub mod debounce;
pub mod fault;
pub mod median;

pub use debounce::Debouncer;
pub use fault::{AnalogFaultDetector, PresenceFaultDetector};
pub use median::MedianFilter;

/// Sentinel for a failed raw read (e.g. ADC error at the port boundary).
/// The conditioner rejects it and holds its previous output.
pub const INVALID_RAW: i32 = i32::MIN;

/// Identity of a monitored signal, used in fault logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorId {
    /// Light-dependent resistor, raw ADC counts (higher = darker).
    Ldr,
    /// Externally produced presence/occupancy flag.
    Presence,
    /// Room temperature, deci-degrees Celsius.
    Temperature,
    /// Air-quality sensor, raw counts.
    AirQuality,
}

impl SensorId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ldr => "ldr",
            Self::Presence => "presence",
            Self::Temperature => "temperature",
            Self::AirQuality => "air-quality",
        }
    }
}

/// Output of analog conditioning. `stable == false` (empty window so far)
/// suppresses downstream action for the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionedSample {
    pub value: i32,
    pub stable: bool,
}

/// A raw presence observation from the external detector, carrying the
/// timestamp it was produced at so staleness is checkable downstream.
#[derive(Debug, Clone, Copy)]
pub struct PresenceObservation {
    pub asserted: bool,
    pub observed_at_ms: u64,
}
