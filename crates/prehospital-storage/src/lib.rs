//! prehospital-storage
//!
//! SQLite persistence for users, forms, injuries, rate-limit counters and the
//! activity log. Every statement is parameterized; functions take a borrowed
//! connection so callers decide how it is shared.

pub mod activity;
pub mod db;
pub mod error;
pub mod forms;
pub mod injuries;
pub mod rate_limits;
pub mod users;

mod convert;
