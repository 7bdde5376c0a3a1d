//! prehospital-audit
//!
//! Application-level audit trail: every event is logged through `tracing`
//! and kept in the `activity_log` table.

pub mod actions;
pub mod error;
pub mod events;
