//! Integration test entry point.
//!
//! Drives the full [`AppService`](roomctl::app::service::AppService)
//! through the port traits with mock adapters — no hardware, no network,
//! no real time.

mod control_loop_tests;
mod mock_hw;
mod offline_sync_tests;
