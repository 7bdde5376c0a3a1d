//! Fixed-window counters keyed by `(action, actor)`.
//!
//! Callers check before doing the work and record only once it succeeded, so
//! rejected attempts never consume the allowance. Access is serialized by the
//! caller's connection lock.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub limit: u32,
    pub window_secs: i64,
}

impl RatePolicy {
    pub const fn per_day(limit: u32) -> Self {
        Self {
            limit,
            window_secs: 86_400,
        }
    }

    pub const fn per_hour(limit: u32) -> Self {
        Self {
            limit,
            window_secs: 3_600,
        }
    }

    fn window_start(&self, now: jiff::Timestamp) -> i64 {
        let secs = now.as_second();
        secs - secs.rem_euclid(self.window_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

fn current_count(
    conn: &Connection,
    action: &str,
    actor: &str,
    window_start: i64,
) -> Result<u32, StorageError> {
    let count = conn
        .query_row(
            "SELECT count FROM rate_limits
             WHERE action = ?1 AND actor = ?2 AND window_start = ?3",
            params![action, actor, window_start],
            |row| row.get::<_, u32>(0),
        )
        .optional()?;
    Ok(count.unwrap_or(0))
}

pub fn check(
    conn: &Connection,
    action: &str,
    actor: &str,
    policy: RatePolicy,
    now: jiff::Timestamp,
) -> Result<RateDecision, StorageError> {
    let window_start = policy.window_start(now);
    let count = current_count(conn, action, actor, window_start)?;

    if count >= policy.limit {
        let retry_after = window_start + policy.window_secs - now.as_second();
        return Ok(RateDecision::Limited {
            retry_after_secs: u64::try_from(retry_after.max(1)).unwrap_or(1),
        });
    }
    Ok(RateDecision::Allowed {
        remaining: policy.limit - count,
    })
}

/// Count one use of `action` by `actor` in the current window.
pub fn record(
    conn: &Connection,
    action: &str,
    actor: &str,
    policy: RatePolicy,
    now: jiff::Timestamp,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO rate_limits (action, actor, window_start, count) VALUES (?1, ?2, ?3, 1)
         ON CONFLICT (action, actor, window_start) DO UPDATE SET count = count + 1",
        params![action, actor, policy.window_start(now)],
    )?;
    Ok(())
}

/// Forget every counter for `(action, actor)`, e.g. after a successful login.
pub fn reset(conn: &Connection, action: &str, actor: &str) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM rate_limits WHERE action = ?1 AND actor = ?2",
        params![action, actor],
    )?;
    Ok(())
}

/// Drop counters whose window started more than a day before `before`.
/// No policy window is longer than a day. Returns the number removed.
pub fn prune(conn: &Connection, before: jiff::Timestamp) -> Result<usize, StorageError> {
    let removed = conn.execute(
        "DELETE FROM rate_limits WHERE window_start < ?1",
        params![before.as_second() - 86_400],
    )?;
    Ok(removed)
}
