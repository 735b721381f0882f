//! Outbound application events and the state snapshot wire shape.
//!
//! The [`AppService`](super::service::AppService) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to the console,
//! forward to telemetry, update a display.

use serde::Serialize;

use crate::control::{ActuatorCommand, ChannelId, Mode};
use crate::error::FaultFlag;

/// Immutable record of one channel's observable state at one tick.
///
/// This is the unit stored in the offline log buffer and pushed upstream:
/// live state and buffered log entries share the shape. `signal` is the
/// conditioned driving value; cloud adapters rename it per channel
/// (`ldrRaw` for lighting, deci-`tempC` for climate) at the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    /// Epoch ms when wall time is synced, monotonic ms otherwise.
    pub ts: u64,
    pub mode: Mode,
    pub signal: i32,
    /// Command the control layer decided on (`{on, pwm}` on the wire).
    pub actuator: ActuatorCommand,
    pub band: heapless::String<12>,
    #[serde(rename = "sensorError")]
    pub sensor_error: Option<&'static str>,
    pub presence: bool,
    /// Air-quality classification, climate channel only.
    #[serde(rename = "aqStatus", skip_serializing_if = "Option::is_none")]
    pub aq_status: Option<&'static str>,
    /// Whether the last cloud exchange succeeded — lets a viewer tell
    /// "operating offline" from "healthy" on buffered entries.
    pub online: bool,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started ticking.
    Started,

    /// A channel's mode was switched by an external command.
    ModeChanged { channel: ChannelId, mode: Mode },

    /// A channel's hysteresis band transitioned.
    BandChanged {
        channel: ChannelId,
        from: heapless::String<12>,
        to: heapless::String<12>,
    },

    /// A sensor fault was raised on a channel.
    FaultRaised { channel: ChannelId, flag: FaultFlag },

    /// A channel's sensors all recovered.
    FaultCleared { channel: ChannelId },

    /// A cloud operation failed; next attempt delayed by `delay_ms`.
    CloudBackoff { delay_ms: u64 },

    /// Cloud connectivity restored after one or more failures.
    CloudRecovered,
}
