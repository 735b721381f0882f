//! Time adapters.
//!
//! [`MonotonicClock`] is the production clock: monotonic milliseconds from
//! `Instant`, wall-clock epoch from `SystemTime` with an obviously-unsynced
//! guard (pre-2020 readings are rejected, e.g. before NTP sync).
//!
//! [`ManualClock`] is fully deterministic and advanced by hand — tests and
//! simulations use it to cover minutes of behavior without real delays.

use core::cell::Cell;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::Clock;

/// Reject wall-clock readings before 2020-01-01 as unsynced.
const EPOCH_2020_MS: u64 = 1_577_836_800_000;

pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn epoch_ms(&self) -> Option<u64> {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()?
            .as_millis() as u64;
        (ms >= EPOCH_2020_MS).then_some(ms)
    }
}

/// Hand-advanced clock for tests and simulation.
pub struct ManualClock {
    now: Cell<u64>,
    epoch_offset: Cell<Option<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            epoch_offset: Cell::new(None),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    /// Simulate NTP sync: wall clock becomes `offset + monotonic`.
    pub fn sync_epoch(&self, offset_ms: u64) {
        self.epoch_offset.set(Some(offset_ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn epoch_ms(&self) -> Option<u64> {
        self.epoch_offset.get().map(|o| o + self.now.get())
    }
}
