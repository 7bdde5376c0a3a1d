use rusqlite::{Connection, params};

use prehospital_core::models::injury::InjuryMarker;

use crate::error::StorageError;

/// Replace every injury row of a form with `markers`.
///
/// Call inside the transaction that writes the parent form row; the first
/// failing insert aborts the whole save when the caller drops the transaction.
pub fn replace_all(
    conn: &Connection,
    form_id: i64,
    markers: &[InjuryMarker],
    max: usize,
) -> Result<usize, StorageError> {
    if markers.len() > max {
        return Err(StorageError::TooManyInjuries {
            count: markers.len(),
            max,
        });
    }

    conn.execute("DELETE FROM injuries WHERE form_id = ?1", params![form_id])?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO injuries
         (form_id, injury_number, injury_type, body_view, coordinate_x, coordinate_y, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for marker in markers {
        stmt.execute(params![
            form_id,
            marker.number,
            marker.injury_type.as_str(),
            marker.view.as_str(),
            marker.x,
            marker.y,
            marker.notes,
        ])?;
    }

    Ok(markers.len())
}

/// Injuries of a form, ordered by injury number.
pub fn list_for_form(conn: &Connection, form_id: i64) -> Result<Vec<InjuryMarker>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT injury_number, injury_type, body_view, coordinate_x, coordinate_y, notes
         FROM injuries WHERE form_id = ?1 ORDER BY injury_number",
    )?;

    let rows = stmt.query_map(params![form_id], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut markers = Vec::new();
    for row in rows {
        let (number, injury_type, view, x, y, notes) = row?;
        markers.push(InjuryMarker {
            number,
            injury_type: injury_type.parse()?,
            view: view.parse()?,
            x,
            y,
            notes,
        });
    }
    Ok(markers)
}
