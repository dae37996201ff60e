//! Domain primitives for alarm-driven instance stopping.
//!
//! This crate owns envelope unwrapping, identifier extraction, the stop
//! decision state machine and batch outcome aggregation. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod alarm;
pub mod contract;
pub mod envelope;
pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod outcome;
