//! Application layer — the hexagonal core and its boundary types.
//!
//! [`service::AppService`] owns the two control channels, the offline log
//! buffer, and the cloud sync engine. All I/O flows through the port
//! traits in [`ports`], making the entire service testable with mock
//! adapters.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
