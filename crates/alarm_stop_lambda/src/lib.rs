//! AWS-oriented adapters and handlers for alarm-driven instance stopping.
//!
//! This crate owns runtime integration details (the queue batch handler,
//! configuration, logging and the control plane seam) on top of the domain
//! primitives in `alarm_stop_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;
