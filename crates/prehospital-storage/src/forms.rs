//! Form rows and their injury children.
//!
//! A save writes the form row and replaces its injury list inside one
//! transaction: both commit or neither does. Updates are last-write-wins.

use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, Transaction, params, params_from_iter};

use prehospital_core::form_code;
use prehospital_core::models::form::{
    FormFields, FormRecord, FormSummary, PrehospitalForm, ValidatedForm,
};
use prehospital_core::models::page::{FormFilter, Page};

use crate::convert;
use crate::error::StorageError;
use crate::injuries;

const FORM_CODE_ATTEMPTS: usize = 5;

/// Editable columns, in the order produced by [`field_values`].
const FIELD_COLUMNS: [&str; 40] = [
    "incident_date",
    "incident_time",
    "incident_location",
    "nature_of_call",
    "call_received_at",
    "arrived_scene_at",
    "departed_scene_at",
    "arrived_hospital_at",
    "patient_name",
    "patient_age",
    "patient_sex",
    "patient_address",
    "patient_contact",
    "next_of_kin",
    "next_of_kin_contact",
    "blood_pressure",
    "pulse_rate",
    "respiratory_rate",
    "temperature_c",
    "oxygen_saturation",
    "gcs_score",
    "blood_glucose",
    "pain_score",
    "chief_complaint",
    "level_of_consciousness",
    "airway_status",
    "breathing_status",
    "circulation_status",
    "allergies",
    "medications",
    "medical_history",
    "interventions",
    "medications_given",
    "care_notes",
    "team_leader",
    "team_members",
    "vehicle_number",
    "receiving_hospital",
    "receiving_personnel",
    "endorsement_notes",
];

fn text(v: &Option<String>) -> Value {
    v.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn int(v: Option<u32>) -> Value {
    v.map(|n| Value::Integer(i64::from(n))).unwrap_or(Value::Null)
}

fn real(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

fn json_list(v: &[String]) -> Result<Value, StorageError> {
    Ok(Value::Text(serde_json::to_string(v)?))
}

fn field_values(f: &FormFields) -> Result<Vec<Value>, StorageError> {
    Ok(vec![
        f.incident_date
            .map(|d| Value::Text(d.to_string()))
            .unwrap_or(Value::Null),
        text(&f.incident_time),
        text(&f.incident_location),
        text(&f.nature_of_call),
        text(&f.call_received_at),
        text(&f.arrived_scene_at),
        text(&f.departed_scene_at),
        text(&f.arrived_hospital_at),
        text(&f.patient_name),
        int(f.patient_age),
        f.patient_sex
            .map(|s| Value::Text(s.as_str().to_string()))
            .unwrap_or(Value::Null),
        text(&f.patient_address),
        text(&f.patient_contact),
        text(&f.next_of_kin),
        text(&f.next_of_kin_contact),
        text(&f.blood_pressure),
        int(f.pulse_rate),
        int(f.respiratory_rate),
        real(f.temperature_c),
        int(f.oxygen_saturation),
        int(f.gcs_score),
        real(f.blood_glucose),
        int(f.pain_score),
        text(&f.chief_complaint),
        json_list(&f.level_of_consciousness)?,
        json_list(&f.airway_status)?,
        json_list(&f.breathing_status)?,
        json_list(&f.circulation_status)?,
        text(&f.allergies),
        text(&f.medications),
        text(&f.medical_history),
        json_list(&f.interventions)?,
        text(&f.medications_given),
        text(&f.care_notes),
        text(&f.team_leader),
        json_list(&f.team_members)?,
        text(&f.vehicle_number),
        text(&f.receiving_hospital),
        text(&f.receiving_personnel),
        text(&f.endorsement_notes),
    ])
}

/// Raw form row as read from SQLite, converted outside the row callback.
struct FormRow {
    id: i64,
    form_code: String,
    status: String,
    created_by: i64,
    created_at: String,
    updated_at: String,
    incident_date: Option<String>,
    incident_time: Option<String>,
    incident_location: Option<String>,
    nature_of_call: Option<String>,
    call_received_at: Option<String>,
    arrived_scene_at: Option<String>,
    departed_scene_at: Option<String>,
    arrived_hospital_at: Option<String>,
    patient_name: Option<String>,
    patient_age: Option<i64>,
    patient_sex: Option<String>,
    patient_address: Option<String>,
    patient_contact: Option<String>,
    next_of_kin: Option<String>,
    next_of_kin_contact: Option<String>,
    blood_pressure: Option<String>,
    pulse_rate: Option<i64>,
    respiratory_rate: Option<i64>,
    temperature_c: Option<f64>,
    oxygen_saturation: Option<i64>,
    gcs_score: Option<i64>,
    blood_glucose: Option<f64>,
    pain_score: Option<i64>,
    chief_complaint: Option<String>,
    level_of_consciousness: Option<String>,
    airway_status: Option<String>,
    breathing_status: Option<String>,
    circulation_status: Option<String>,
    allergies: Option<String>,
    medications: Option<String>,
    medical_history: Option<String>,
    interventions: Option<String>,
    medications_given: Option<String>,
    care_notes: Option<String>,
    team_leader: Option<String>,
    team_members: Option<String>,
    vehicle_number: Option<String>,
    receiving_hospital: Option<String>,
    receiving_personnel: Option<String>,
    endorsement_notes: Option<String>,
}

impl FormRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            form_code: row.get("form_code")?,
            status: row.get("status")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            incident_date: row.get("incident_date")?,
            incident_time: row.get("incident_time")?,
            incident_location: row.get("incident_location")?,
            nature_of_call: row.get("nature_of_call")?,
            call_received_at: row.get("call_received_at")?,
            arrived_scene_at: row.get("arrived_scene_at")?,
            departed_scene_at: row.get("departed_scene_at")?,
            arrived_hospital_at: row.get("arrived_hospital_at")?,
            patient_name: row.get("patient_name")?,
            patient_age: row.get("patient_age")?,
            patient_sex: row.get("patient_sex")?,
            patient_address: row.get("patient_address")?,
            patient_contact: row.get("patient_contact")?,
            next_of_kin: row.get("next_of_kin")?,
            next_of_kin_contact: row.get("next_of_kin_contact")?,
            blood_pressure: row.get("blood_pressure")?,
            pulse_rate: row.get("pulse_rate")?,
            respiratory_rate: row.get("respiratory_rate")?,
            temperature_c: row.get("temperature_c")?,
            oxygen_saturation: row.get("oxygen_saturation")?,
            gcs_score: row.get("gcs_score")?,
            blood_glucose: row.get("blood_glucose")?,
            pain_score: row.get("pain_score")?,
            chief_complaint: row.get("chief_complaint")?,
            level_of_consciousness: row.get("level_of_consciousness")?,
            airway_status: row.get("airway_status")?,
            breathing_status: row.get("breathing_status")?,
            circulation_status: row.get("circulation_status")?,
            allergies: row.get("allergies")?,
            medications: row.get("medications")?,
            medical_history: row.get("medical_history")?,
            interventions: row.get("interventions")?,
            medications_given: row.get("medications_given")?,
            care_notes: row.get("care_notes")?,
            team_leader: row.get("team_leader")?,
            team_members: row.get("team_members")?,
            vehicle_number: row.get("vehicle_number")?,
            receiving_hospital: row.get("receiving_hospital")?,
            receiving_personnel: row.get("receiving_personnel")?,
            endorsement_notes: row.get("endorsement_notes")?,
        })
    }

    fn into_form(self) -> Result<PrehospitalForm, StorageError> {
        let fields = FormFields {
            incident_date: convert::opt_date("incident_date", self.incident_date)?,
            incident_time: self.incident_time,
            incident_location: self.incident_location,
            nature_of_call: self.nature_of_call,
            call_received_at: self.call_received_at,
            arrived_scene_at: self.arrived_scene_at,
            departed_scene_at: self.departed_scene_at,
            arrived_hospital_at: self.arrived_hospital_at,
            patient_name: self.patient_name,
            patient_age: convert::opt_u32("patient_age", self.patient_age)?,
            patient_sex: self.patient_sex.map(|s| s.parse()).transpose()?,
            patient_address: self.patient_address,
            patient_contact: self.patient_contact,
            next_of_kin: self.next_of_kin,
            next_of_kin_contact: self.next_of_kin_contact,
            blood_pressure: self.blood_pressure,
            pulse_rate: convert::opt_u32("pulse_rate", self.pulse_rate)?,
            respiratory_rate: convert::opt_u32("respiratory_rate", self.respiratory_rate)?,
            temperature_c: self.temperature_c,
            oxygen_saturation: convert::opt_u32("oxygen_saturation", self.oxygen_saturation)?,
            gcs_score: convert::opt_u32("gcs_score", self.gcs_score)?,
            blood_glucose: self.blood_glucose,
            pain_score: convert::opt_u32("pain_score", self.pain_score)?,
            chief_complaint: self.chief_complaint,
            level_of_consciousness: convert::string_list(self.level_of_consciousness)?,
            airway_status: convert::string_list(self.airway_status)?,
            breathing_status: convert::string_list(self.breathing_status)?,
            circulation_status: convert::string_list(self.circulation_status)?,
            allergies: self.allergies,
            medications: self.medications,
            medical_history: self.medical_history,
            interventions: convert::string_list(self.interventions)?,
            medications_given: self.medications_given,
            care_notes: self.care_notes,
            team_leader: self.team_leader,
            team_members: convert::string_list(self.team_members)?,
            vehicle_number: self.vehicle_number,
            receiving_hospital: self.receiving_hospital,
            receiving_personnel: self.receiving_personnel,
            endorsement_notes: self.endorsement_notes,
        };

        Ok(PrehospitalForm {
            id: self.id,
            form_code: self.form_code,
            status: self.status.parse()?,
            created_by: self.created_by,
            fields,
            created_at: convert::timestamp("created_at", &self.created_at)?,
            updated_at: convert::timestamp("updated_at", &self.updated_at)?,
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
            && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Write a new form and its injuries inside the caller's transaction.
/// Nothing is visible until the caller commits.
///
/// The form code uses the creation date in the server's local time zone.
pub fn create(
    tx: &Transaction<'_>,
    created_by: i64,
    form: &ValidatedForm,
    max_injuries: usize,
    now: jiff::Timestamp,
) -> Result<FormRecord, StorageError> {
    if form.injuries.len() > max_injuries {
        return Err(StorageError::TooManyInjuries {
            count: form.injuries.len(),
            max: max_injuries,
        });
    }

    let today = now.to_zoned(jiff::tz::TimeZone::system()).date();
    let columns = FIELD_COLUMNS.join(", ");
    let placeholders = vec!["?"; FIELD_COLUMNS.len() + 5].join(", ");
    let sql = format!(
        "INSERT INTO prehospital_forms
         (form_code, status, created_by, created_at, updated_at, {columns})
         VALUES ({placeholders})"
    );
    let stamp = convert::to_text(now);

    let mut attempt = 0;
    let form_id = loop {
        attempt += 1;
        let code = form_code::generate(today);
        let mut values = vec![
            Value::Text(code.clone()),
            Value::Text(form.status.as_str().to_string()),
            Value::Integer(created_by),
            Value::Text(stamp.clone()),
            Value::Text(stamp.clone()),
        ];
        values.extend(field_values(&form.fields)?);

        match tx.execute(&sql, params_from_iter(values)) {
            Ok(_) => break tx.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) && attempt < FORM_CODE_ATTEMPTS => {
                tracing::warn!(code, attempt, "form code collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let written = injuries::replace_all(tx, form_id, &form.injuries, max_injuries)?;
    let record = read_record(tx, form_id)?;

    tracing::info!(
        form_id,
        form_code = %record.form.form_code,
        injuries = written,
        "form written"
    );
    Ok(record)
}

/// Overwrite a form's fields and replace its injuries inside the caller's
/// transaction.
pub fn update(
    tx: &Transaction<'_>,
    id: i64,
    form: &ValidatedForm,
    max_injuries: usize,
    now: jiff::Timestamp,
) -> Result<FormRecord, StorageError> {
    if form.injuries.len() > max_injuries {
        return Err(StorageError::TooManyInjuries {
            count: form.injuries.len(),
            max: max_injuries,
        });
    }

    let assignments = FIELD_COLUMNS
        .iter()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE prehospital_forms SET status = ?, updated_at = ?, {assignments} WHERE id = ?"
    );

    let mut values = vec![
        Value::Text(form.status.as_str().to_string()),
        Value::Text(convert::to_text(now)),
    ];
    values.extend(field_values(&form.fields)?);
    values.push(Value::Integer(id));

    let updated = tx.execute(&sql, params_from_iter(values))?;
    if updated == 0 {
        return Err(StorageError::not_found("form", id));
    }
    let written = injuries::replace_all(tx, id, &form.injuries, max_injuries)?;
    let record = read_record(tx, id)?;

    tracing::info!(form_id = id, injuries = written, "form rewritten");
    Ok(record)
}

pub fn get(conn: &Connection, id: i64) -> Result<FormRecord, StorageError> {
    read_record(conn, id)
}

/// Owner id of a form, for authorization checks before a write.
pub fn owner_of(conn: &Connection, id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT created_by FROM prehospital_forms WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("form", id))
}

/// Delete a form; its injuries go with it through the foreign key cascade.
pub fn delete(conn: &Connection, id: i64) -> Result<(), StorageError> {
    let deleted = conn.execute("DELETE FROM prehospital_forms WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(StorageError::not_found("form", id));
    }
    tracing::info!(form_id = id, "form deleted");
    Ok(())
}

fn read_record(conn: &Connection, id: i64) -> Result<FormRecord, StorageError> {
    let row = conn
        .query_row(
            "SELECT * FROM prehospital_forms WHERE id = ?1",
            params![id],
            FormRow::read,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("form", id))?;

    Ok(FormRecord {
        form: row.into_form()?,
        injuries: injuries::list_for_form(conn, id)?,
    })
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Filtered, paginated records list, newest first.
pub fn list(conn: &Connection, filter: &FormFilter) -> Result<Page<FormSummary>, StorageError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        clauses.push("f.status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(owner) = filter.created_by {
        clauses.push("f.created_by = ?");
        values.push(Value::Integer(owner));
    }
    if let Some(from) = filter.date_from {
        clauses.push("f.incident_date >= ?");
        values.push(Value::Text(from.to_string()));
    }
    if let Some(to) = filter.date_to {
        clauses.push("f.incident_date <= ?");
        values.push(Value::Text(to.to_string()));
    }
    if let Some(term) = filter.search_term() {
        clauses.push(
            "(f.form_code LIKE ? ESCAPE '\\' OR f.patient_name LIKE ? ESCAPE '\\' \
             OR f.incident_location LIKE ? ESCAPE '\\')",
        );
        let pattern = escape_like(term);
        values.extend(std::iter::repeat_n(Value::Text(pattern), 3));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM prehospital_forms f {where_sql}"),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    let page = filter.page();
    let per_page = filter.per_page();
    values.push(Value::Integer(i64::from(per_page)));
    values.push(Value::Integer(i64::try_from(filter.offset()).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare(&format!(
        "SELECT f.id, f.form_code, f.status, f.patient_name, f.incident_date,
                f.incident_location, f.created_by, u.full_name,
                (SELECT COUNT(*) FROM injuries i WHERE i.form_id = f.id),
                f.created_at, f.updated_at
         FROM prehospital_forms f
         JOIN users u ON u.id = f.created_by
         {where_sql}
         ORDER BY f.created_at DESC, f.id DESC
         LIMIT ? OFFSET ?"
    ))?;

    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, u32>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, String>(10)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (
            id,
            form_code,
            status,
            patient_name,
            incident_date,
            incident_location,
            created_by,
            created_by_name,
            injury_count,
            created_at,
            updated_at,
        ) = row?;
        items.push(FormSummary {
            id,
            form_code,
            status: status.parse()?,
            patient_name,
            incident_date: convert::opt_date("incident_date", incident_date)?,
            incident_location,
            created_by,
            created_by_name,
            injury_count,
            created_at: convert::timestamp("created_at", &created_at)?,
            updated_at: convert::timestamp("updated_at", &updated_at)?,
        });
    }

    Ok(Page::new(
        items,
        u64::try_from(total).unwrap_or(0),
        page,
        per_page,
    ))
}
