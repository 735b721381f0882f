//! Actuator drivers — dumb outputs with guardrails.
//!
//! Policy lives in the control core; a driver only enforces the hardware
//! contract: clamped duty, forced-zero when off, idempotent re-apply, and
//! a soft-start kick for loads that stall at low duty.

pub mod actuator;

pub use actuator::PwmActuator;
