use rusqlite::{Connection, params};

use prehospital_core::models::activity::ActivityEntry;

use crate::convert;
use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub resource_type: &'a str,
    pub resource_id: Option<&'a str>,
    pub details: Option<&'a serde_json::Value>,
}

pub fn insert(
    conn: &Connection,
    entry: &NewActivity<'_>,
    now: jiff::Timestamp,
) -> Result<i64, StorageError> {
    let details = entry.details.map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO activity_log (user_id, action, resource_type, resource_id, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.user_id,
            entry.action,
            entry.resource_type,
            entry.resource_id,
            details,
            convert::to_text(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent entries first, optionally narrowed to one resource.
pub fn list_recent(
    conn: &Connection,
    resource: Option<(&str, &str)>,
    limit: u32,
) -> Result<Vec<ActivityEntry>, StorageError> {
    let (resource_type, resource_id) = resource.unzip();
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action, resource_type, resource_id, details, created_at
         FROM activity_log
         WHERE (?1 IS NULL OR resource_type = ?1) AND (?2 IS NULL OR resource_id = ?2)
         ORDER BY id DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![resource_type, resource_id, limit], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, user_id, action, resource_type, resource_id, details, created_at) = row?;
        entries.push(ActivityEntry {
            id,
            user_id,
            action,
            resource_type,
            resource_id,
            details: details.map(|d| serde_json::from_str(&d)).transpose()?,
            created_at: convert::timestamp("created_at", &created_at)?,
        });
    }
    Ok(entries)
}
