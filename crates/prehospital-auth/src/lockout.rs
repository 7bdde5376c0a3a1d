use prehospital_core::models::user::User;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCK_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: jiff::SignedDuration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_duration: jiff::SignedDuration::from_mins(DEFAULT_LOCK_MINUTES),
        }
    }
}

/// New failure bookkeeping for a user after a bad password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutUpdate {
    pub failed_attempts: u32,
    pub locked_until: Option<jiff::Timestamp>,
}

impl LockoutPolicy {
    /// When the account is locked at `now`, the time the lock ends.
    pub fn locked_until(&self, user: &User, now: jiff::Timestamp) -> Option<jiff::Timestamp> {
        user.locked_until.filter(|until| *until > now)
    }

    /// Count one more failure. Reaching `max_attempts` locks the account; a
    /// lock that has already expired starts the count over.
    pub fn register_failure(&self, user: &User, now: jiff::Timestamp) -> LockoutUpdate {
        let previous = match user.locked_until {
            Some(until) if until <= now => 0,
            _ => user.failed_attempts,
        };
        let failed_attempts = previous.saturating_add(1);

        let locked_until = if failed_attempts >= self.max_attempts {
            tracing::warn!(user_id = user.id, failed_attempts, "account locked");
            Some(now + self.lock_duration)
        } else {
            None
        };

        LockoutUpdate {
            failed_attempts,
            locked_until,
        }
    }
}
