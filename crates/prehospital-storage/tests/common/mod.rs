#![allow(dead_code)]

use rusqlite::Connection;

use prehospital_core::models::form::{FormFields, FormStatus, ValidatedForm};
use prehospital_core::models::injury::{BodyView, InjuryMarker, InjuryType};
use prehospital_core::models::user::{Role, User};
use prehospital_storage::db;
use prehospital_storage::users::{self, NewUser};

pub fn now() -> jiff::Timestamp {
    "2026-10-18T08:30:00Z".parse().unwrap()
}

pub fn memory_db() -> Connection {
    db::open_memory_database().unwrap()
}

pub fn user(conn: &Connection, username: &str, role: Role) -> User {
    users::create_user(
        conn,
        &NewUser {
            username: username.to_string(),
            full_name: format!("{username} full name"),
            password_hash: "pbkdf2-sha256$1$c2FsdA$aGFzaA".to_string(),
            role,
        },
        now(),
    )
    .unwrap()
}

pub fn injury(number: u32, view: BodyView) -> InjuryMarker {
    InjuryMarker {
        number,
        injury_type: InjuryType::Laceration,
        view,
        x: 30.0,
        y: 45.5,
        notes: Some(format!("injury {number}")),
    }
}

pub fn form(patient: &str, injuries: Vec<InjuryMarker>) -> ValidatedForm {
    ValidatedForm {
        status: FormStatus::Completed,
        fields: FormFields {
            incident_date: Some(jiff::civil::date(2026, 10, 17)),
            incident_location: Some("Barangay Hall, Poblacion".to_string()),
            patient_name: Some(patient.to_string()),
            patient_age: Some(42),
            pulse_rate: Some(96),
            temperature_c: Some(37.2),
            airway_status: vec!["Patent".to_string()],
            interventions: vec!["Wound care".to_string(), "Splinting".to_string()],
            ..Default::default()
        },
        injuries,
    }
}
