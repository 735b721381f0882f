//! Room control core library.
//!
//! Automates a dimmable light and a variable-speed fan from noisy
//! analog/digital sensors, with manual override and tolerance for network
//! loss. One generalized control pipeline — conditioning, fault
//! detection, mode arbitration, two-threshold hysteresis, level mapping —
//! instantiated per channel, plus an offline log buffer drained with
//! exponential backoff.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection; all I/O goes through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod app;
pub mod cloud;
pub mod config;
pub mod control;
pub mod drivers;
pub mod signal;

mod error;

pub mod adapters;

pub use error::{CommsError, Error, FaultFlag, Result};
