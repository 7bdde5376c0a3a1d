use rusqlite::Connection;

use prehospital_audit::actions;
use prehospital_audit::events::AuditEvent;
use prehospital_auth::password::hash_password;
use prehospital_core::models::user::{Role, User};
use prehospital_storage::users::{self, NewUser};

use crate::config::BootstrapAdmin;

/// Create the configured admin account unless the username already exists.
/// Returns the new user, or `None` when nothing was created.
pub fn ensure_admin(
    conn: &Connection,
    admin: &BootstrapAdmin,
    now: jiff::Timestamp,
) -> eyre::Result<Option<User>> {
    ensure_admin_with(conn, admin, now, hash_password)
}

pub fn ensure_admin_with(
    conn: &Connection,
    admin: &BootstrapAdmin,
    now: jiff::Timestamp,
    hash: impl FnOnce(&str) -> String,
) -> eyre::Result<Option<User>> {
    if users::find_credentials(conn, &admin.username)?.is_some() {
        tracing::debug!(username = %admin.username, "bootstrap admin already present");
        return Ok(None);
    }

    let user = users::create_user(
        conn,
        &NewUser {
            username: admin.username.clone(),
            full_name: admin.username.clone(),
            password_hash: hash(&admin.password),
            role: Role::Admin,
        },
        now,
    )?;
    AuditEvent::new(actions::USER_CREATE, actions::RESOURCE_USER)
        .resource(user.id)
        .by(user.id)
        .record(conn, now)?;
    tracing::info!(user_id = user.id, username = %user.username, "bootstrap admin created");
    Ok(Some(user))
}
