//! Offline-tolerant cloud plumbing.
//!
//! Every logging tick appends a [`StateSnapshot`](crate::app::events::StateSnapshot)
//! to the fixed-capacity [`LogBuffer`]; the [`CloudSync`](sync::CloudSync)
//! engine drains it one entry per cloud tick with exponential backoff on
//! failure. Loss is bounded and oldest-first: when the buffer is full the
//! oldest unsent entry is evicted, never the newest.

pub mod buffer;
pub mod sync;

pub use buffer::{LogBuffer, LogEntry};
pub use sync::{Backoff, CloudSync};
