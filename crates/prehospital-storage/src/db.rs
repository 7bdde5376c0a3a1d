use std::path::Path;

use rusqlite::Connection;

use crate::error::StorageError;

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../migrations/001_initial.sql"))];

/// Open a SQLite database at `path` and bring its schema up to date.
pub fn open_database(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    tracing::info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Open an in-memory database (tests and local experiments).
pub fn open_memory_database() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Apply every migration newer than the recorded schema version, each in its
/// own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn);

    for &(version, sql) in MIGRATIONS {
        if version <= current {
            continue;
        }
        tracing::info!(version, "running migration");
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| StorageError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        tx.commit()?;
    }

    Ok(())
}

/// Current schema version, 0 for an empty database.
pub fn current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _)| *v).unwrap_or(0)
}
