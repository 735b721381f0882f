//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger. A telemetry or display adapter would implement the same
//! trait.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | control loop running");
            }
            AppEvent::ModeChanged { channel, mode } => {
                info!("MODE  | {} -> {:?}", channel.label(), mode);
            }
            AppEvent::BandChanged { channel, from, to } => {
                info!("BAND  | {} {} -> {}", channel.label(), from, to);
            }
            AppEvent::FaultRaised { channel, flag } => {
                info!("FAULT | {} {}", channel.label(), flag);
            }
            AppEvent::FaultCleared { channel } => {
                info!("FAULT | {} cleared", channel.label());
            }
            AppEvent::CloudBackoff { delay_ms } => {
                info!("CLOUD | offline, retry in {} ms", delay_ms);
            }
            AppEvent::CloudRecovered => {
                info!("CLOUD | recovered");
            }
        }
    }
}
