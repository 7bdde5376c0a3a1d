use rusqlite::{Connection, OptionalExtension, Row, params};

use prehospital_core::models::user::{Role, User, UserStatus};

use crate::convert;
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
}

/// A user row together with its password hash, for login checks only.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub user: User,
    pub password_hash: String,
}

const USER_COLUMNS: &str = "id, username, full_name, role, status, failed_attempts, \
                            locked_until, last_login_at, created_at";

struct UserRow {
    id: i64,
    username: String,
    full_name: String,
    role: String,
    status: String,
    failed_attempts: i64,
    locked_until: Option<String>,
    last_login_at: Option<String>,
    created_at: String,
}

impl UserRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            full_name: row.get("full_name")?,
            role: row.get("role")?,
            status: row.get("status")?,
            failed_attempts: row.get("failed_attempts")?,
            locked_until: row.get("locked_until")?,
            last_login_at: row.get("last_login_at")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, StorageError> {
        Ok(User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            role: self.role.parse()?,
            status: self.status.parse()?,
            failed_attempts: u32::try_from(self.failed_attempts).unwrap_or(u32::MAX),
            locked_until: convert::opt_timestamp("locked_until", self.locked_until)?,
            last_login_at: convert::opt_timestamp("last_login_at", self.last_login_at)?,
            created_at: convert::timestamp("created_at", &self.created_at)?,
        })
    }
}

pub fn create_user(
    conn: &Connection,
    new: &NewUser,
    now: jiff::Timestamp,
) -> Result<User, StorageError> {
    let inserted = conn.execute(
        "INSERT INTO users (username, full_name, password_hash, role, status, created_at)
         VALUES (?1, ?2, ?3, ?4, 'active', ?5)
         ON CONFLICT (username) DO NOTHING",
        params![
            new.username,
            new.full_name,
            new.password_hash,
            new.role.as_str(),
            convert::to_text(now),
        ],
    )?;
    if inserted == 0 {
        return Err(StorageError::Conflict(format!(
            "username already taken: {}",
            new.username
        )));
    }

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, role = %new.role, "user created");
    get_user(conn, id)
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User, StorageError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            UserRow::read,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("user", id))?;
    row.into_user()
}

/// Look up a user by username (case-insensitive) with its password hash.
pub fn find_credentials(
    conn: &Connection,
    username: &str,
) -> Result<Option<StoredCredential>, StorageError> {
    let found = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
            params![username],
            |row| Ok((UserRow::read(row)?, row.get::<_, String>("password_hash")?)),
        )
        .optional()?;

    found
        .map(|(row, password_hash)| {
            Ok(StoredCredential {
                user: row.into_user()?,
                password_hash,
            })
        })
        .transpose()
}

pub fn record_login_failure(
    conn: &Connection,
    id: i64,
    failed_attempts: u32,
    locked_until: Option<jiff::Timestamp>,
) -> Result<(), StorageError> {
    let updated = conn.execute(
        "UPDATE users SET failed_attempts = ?1, locked_until = ?2 WHERE id = ?3",
        params![
            failed_attempts,
            locked_until.map(convert::to_text),
            id
        ],
    )?;
    if updated == 0 {
        return Err(StorageError::not_found("user", id));
    }
    Ok(())
}

/// Reset the failure counter and stamp the login time.
pub fn record_login_success(
    conn: &Connection,
    id: i64,
    now: jiff::Timestamp,
) -> Result<(), StorageError> {
    let updated = conn.execute(
        "UPDATE users SET failed_attempts = 0, locked_until = NULL, last_login_at = ?1
         WHERE id = ?2",
        params![convert::to_text(now), id],
    )?;
    if updated == 0 {
        return Err(StorageError::not_found("user", id));
    }
    Ok(())
}

/// Activate or deactivate an account. Users are never deleted.
pub fn set_status(conn: &Connection, id: i64, status: UserStatus) -> Result<(), StorageError> {
    let updated = conn.execute(
        "UPDATE users SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if updated == 0 {
        return Err(StorageError::not_found("user", id));
    }
    tracing::info!(user_id = id, status = status.as_str(), "user status changed");
    Ok(())
}
