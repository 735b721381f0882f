//! Cloud sync engine: periodic push of live state, one-entry log drain,
//! command polling, and exponential backoff.
//!
//! ```text
//!  ready? ──▶ poll commands ──▶ push live state ──▶ drain one log entry
//!    ▲                                                      │
//!    │            any CommsError: delay doubles             │
//!    └── backoff (1s → 2s → 4s … capped 60s, reset on ok) ◀─┘
//! ```
//!
//! Failures never block the control loop — the engine simply declines to
//! run until the backoff window has passed, and the next scheduled tick
//! retries. There is no cancellation; every operation is polled.

use log::{info, warn};

use crate::app::commands::ManualCommand;
use crate::app::events::{AppEvent, StateSnapshot};
use crate::app::ports::{CloudPort, EventSink};
use crate::cloud::buffer::LogBuffer;
use crate::config::BackoffConfig;
use crate::control::ChannelId;
use crate::error::CommsError;

// ---------------------------------------------------------------------------
// Backoff
// ---------------------------------------------------------------------------

/// Exponential retry delay with a cap, reset to the minimum on success.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    min_ms: u64,
    max_ms: u64,
    delay_ms: u64,
    blocked_until: u64,
}

impl Backoff {
    pub fn new(cfg: &BackoffConfig) -> Self {
        Self {
            min_ms: u64::from(cfg.min_ms),
            max_ms: u64::from(cfg.max_ms),
            delay_ms: u64::from(cfg.min_ms),
            blocked_until: 0,
        }
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        now_ms >= self.blocked_until
    }

    /// Arm the current delay and double it for next time. Returns the
    /// delay that was applied.
    pub fn failure(&mut self, now_ms: u64) -> u64 {
        let applied = self.delay_ms;
        self.blocked_until = now_ms + applied;
        self.delay_ms = (self.delay_ms * 2).min(self.max_ms);
        applied
    }

    pub fn success(&mut self) {
        self.delay_ms = self.min_ms;
        self.blocked_until = 0;
    }

    pub fn current_delay_ms(&self) -> u64 {
        self.delay_ms
    }
}

// ---------------------------------------------------------------------------
// Sync engine
// ---------------------------------------------------------------------------

/// Commands fetched during a sync cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolledCommands {
    pub lighting: Option<ManualCommand>,
    pub climate: Option<ManualCommand>,
}

pub struct CloudSync {
    backoff: Backoff,
    online: bool,
    ever_synced: bool,
}

impl CloudSync {
    pub fn new(cfg: &BackoffConfig) -> Self {
        Self {
            backoff: Backoff::new(cfg),
            online: false,
            ever_synced: false,
        }
    }

    /// Run one sync cycle if the backoff window allows it.
    ///
    /// Exactly one unsent log entry is drained per successful cycle; the
    /// first failed operation aborts the cycle and arms the backoff.
    pub fn tick<const CAP: usize>(
        &mut self,
        cloud: &mut impl CloudPort,
        buffer: &mut LogBuffer<CAP>,
        live_lighting: &StateSnapshot,
        live_climate: &StateSnapshot,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> PolledCommands {
        let mut polled = PolledCommands::default();
        if !self.backoff.ready(now_ms) {
            return polled;
        }

        let result = self.run_cycle(cloud, buffer, live_lighting, live_climate, &mut polled);
        match result {
            Ok(()) => {
                if !self.online && self.ever_synced {
                    info!("cloud: recovered");
                    sink.emit(&AppEvent::CloudRecovered);
                }
                self.online = true;
                self.ever_synced = true;
                self.backoff.success();
            }
            Err(err) => {
                self.online = false;
                let delay_ms = self.backoff.failure(now_ms);
                warn!("cloud: {err}, retrying in {delay_ms} ms");
                sink.emit(&AppEvent::CloudBackoff { delay_ms });
            }
        }
        polled
    }

    /// True if the most recent cloud exchange succeeded.
    pub fn online(&self) -> bool {
        self.online
    }

    fn run_cycle<const CAP: usize>(
        &mut self,
        cloud: &mut impl CloudPort,
        buffer: &mut LogBuffer<CAP>,
        live_lighting: &StateSnapshot,
        live_climate: &StateSnapshot,
        polled: &mut PolledCommands,
    ) -> Result<(), CommsError> {
        polled.lighting = cloud.poll_command(ChannelId::Lighting)?;
        polled.climate = cloud.poll_command(ChannelId::Climate)?;

        cloud.push_state(ChannelId::Lighting, live_lighting)?;
        cloud.push_state(ChannelId::Climate, live_climate)?;

        if let Some(entry) = buffer.next_unsent() {
            cloud.push_log(entry.channel, &entry.snapshot)?;
            entry.sent = true;
        }
        Ok(())
    }
}
