//! Stand-in cloud adapter for standalone/offline runs.
//!
//! Serializes each push to JSON and writes it to the debug log instead of
//! the network; never fails and never returns commands. A production
//! deployment replaces this with an HTTP adapter targeting the upstream
//! database (bounded timeouts, per the [`CloudPort`] contract).

use log::debug;

use crate::app::commands::ManualCommand;
use crate::app::events::StateSnapshot;
use crate::app::ports::CloudPort;
use crate::control::ChannelId;
use crate::error::CommsError;

pub struct LoggingCloud;

impl LoggingCloud {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudPort for LoggingCloud {
    fn push_state(
        &mut self,
        channel: ChannelId,
        snapshot: &StateSnapshot,
    ) -> Result<(), CommsError> {
        match serde_json::to_string(snapshot) {
            Ok(json) => debug!("cloud state {}: {}", channel.label(), json),
            Err(_) => return Err(CommsError::Rejected),
        }
        Ok(())
    }

    fn push_log(&mut self, channel: ChannelId, snapshot: &StateSnapshot) -> Result<(), CommsError> {
        match serde_json::to_string(snapshot) {
            Ok(json) => debug!("cloud log {}/{}: {}", channel.label(), snapshot.ts, json),
            Err(_) => return Err(CommsError::Rejected),
        }
        Ok(())
    }

    fn poll_command(&mut self, _channel: ChannelId) -> Result<Option<ManualCommand>, CommsError> {
        Ok(None)
    }
}
