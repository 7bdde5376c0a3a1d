//! Runtime configuration read from `PREHOSPITAL_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use eyre::WrapErr;

use prehospital_core::limits::{DEFAULT_MAX_INJURIES, DEFAULT_MAX_SUBMISSIONS_PER_DAY, IntakeLimits};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_PATH: &str = "prehospital.db";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 8 * 60 * 60;
pub const DEFAULT_LOGIN_ATTEMPTS_PER_HOUR: u32 = 20;

/// Credentials for the admin account created at startup when missing.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub session_secret: String,
    pub session_ttl: jiff::SignedDuration,
    pub limits: IntakeLimits,
    pub login_attempts_per_hour: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("session_ttl", &self.session_ttl)
            .field("limits", &self.limits)
            .field("login_attempts_per_hour", &self.login_attempts_per_hour)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset and blank values take
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_secret = get("PREHOSPITAL_SESSION_SECRET")
            .ok_or_else(|| eyre::eyre!("PREHOSPITAL_SESSION_SECRET must be set"))?;

        let bootstrap_admin = match (
            get("PREHOSPITAL_BOOTSTRAP_ADMIN"),
            get("PREHOSPITAL_BOOTSTRAP_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => eyre::bail!(
                "PREHOSPITAL_BOOTSTRAP_ADMIN and PREHOSPITAL_BOOTSTRAP_PASSWORD must be set together"
            ),
        };

        let ttl_secs: i64 = parse_or(
            get("PREHOSPITAL_SESSION_TTL_SECS"),
            "PREHOSPITAL_SESSION_TTL_SECS",
            DEFAULT_SESSION_TTL_SECS,
        )?;
        if ttl_secs <= 0 {
            eyre::bail!("PREHOSPITAL_SESSION_TTL_SECS must be positive");
        }

        Ok(Self {
            bind_addr: parse_or(
                get("PREHOSPITAL_BIND_ADDR"),
                "PREHOSPITAL_BIND_ADDR",
                DEFAULT_BIND_ADDR.parse()?,
            )?,
            database_path: get("PREHOSPITAL_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            session_secret,
            session_ttl: jiff::SignedDuration::from_secs(ttl_secs),
            limits: IntakeLimits {
                max_injuries: parse_or(
                    get("PREHOSPITAL_MAX_INJURIES"),
                    "PREHOSPITAL_MAX_INJURIES",
                    DEFAULT_MAX_INJURIES,
                )?,
                max_submissions_per_day: parse_or(
                    get("PREHOSPITAL_MAX_SUBMISSIONS_PER_DAY"),
                    "PREHOSPITAL_MAX_SUBMISSIONS_PER_DAY",
                    DEFAULT_MAX_SUBMISSIONS_PER_DAY,
                )?,
            },
            login_attempts_per_hour: parse_or(
                get("PREHOSPITAL_LOGIN_ATTEMPTS_PER_HOUR"),
                "PREHOSPITAL_LOGIN_ATTEMPTS_PER_HOUR",
                DEFAULT_LOGIN_ATTEMPTS_PER_HOUR,
            )?,
            bootstrap_admin,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
