//! Server-side validation of form submissions.
//!
//! Text fields are trimmed and blank values dropped before any check runs.
//! Field problems are collected so the operator sees all of them at once;
//! an oversized injury list is rejected on its own before anything else is
//! inspected.

use std::ops::RangeInclusive;

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::limits::{IntakeLimits, MAX_CHECKBOX_ITEMS, MAX_LONG_TEXT_LEN, MAX_SHORT_TEXT_LEN};
use crate::models::form::{FormFields, FormStatus, FormSubmission, ValidatedForm};
use crate::models::injury::{InjuryMarker, validate_injuries};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("submission has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),

    #[error("too many injuries: {count} exceeds the maximum of {max}")]
    TooManyInjuries { count: usize, max: usize },
}

const AGE_RANGE: RangeInclusive<u32> = 0..=150;
const PULSE_RANGE: RangeInclusive<u32> = 0..=300;
const RESPIRATORY_RANGE: RangeInclusive<u32> = 0..=120;
const TEMPERATURE_RANGE: RangeInclusive<f64> = 25.0..=45.0;
const SPO2_RANGE: RangeInclusive<u32> = 0..=100;
const GCS_RANGE: RangeInclusive<u32> = 3..=15;
const GLUCOSE_RANGE: RangeInclusive<f64> = 0.0..=100.0;
const PAIN_RANGE: RangeInclusive<u32> = 0..=10;

/// Validate and normalize a submission.
///
/// Drafts may be saved without the required fields; every other check applies
/// regardless of status.
pub fn validate_submission(
    submission: FormSubmission,
    limits: &IntakeLimits,
) -> Result<ValidatedForm, SubmissionError> {
    let FormSubmission {
        status,
        fields,
        injuries,
    } = submission;
    let status = status.unwrap_or_default();

    let mut errors = Vec::new();

    let injuries = match injuries.decode() {
        Ok(list) => list,
        Err(e) => {
            errors.push(FieldError::new("injuries", format!("malformed injury list: {e}")));
            Vec::new()
        }
    };
    if injuries.len() > limits.max_injuries {
        return Err(SubmissionError::TooManyInjuries {
            count: injuries.len(),
            max: limits.max_injuries,
        });
    }

    let fields = normalize(fields);
    check_fields(&fields, status, &mut errors);
    check_injuries(&injuries, limits.max_injuries, &mut errors);

    if errors.is_empty() {
        Ok(ValidatedForm {
            status,
            fields,
            injuries,
        })
    } else {
        Err(SubmissionError::Invalid(errors))
    }
}

fn check_injuries(injuries: &[InjuryMarker], max: usize, errors: &mut Vec<FieldError>) {
    if let Err(e) = validate_injuries(injuries, max) {
        let field = match &e {
            CoreError::CoordinateOutOfRange { number, .. }
            | CoreError::InjuryNotesTooLong { number, .. } => format!("injuries[{number}]"),
            _ => "injuries".to_string(),
        };
        errors.push(FieldError::new(field, e.to_string()));
    }
}

fn check_fields(f: &FormFields, status: FormStatus, errors: &mut Vec<FieldError>) {
    if status != FormStatus::Draft {
        if f.incident_date.is_none() {
            errors.push(FieldError::new("incident_date", "is required"));
        }
        if f.patient_name.is_none() {
            errors.push(FieldError::new("patient_name", "is required"));
        }
    }

    let short_text = [
        ("incident_time", &f.incident_time),
        ("incident_location", &f.incident_location),
        ("nature_of_call", &f.nature_of_call),
        ("call_received_at", &f.call_received_at),
        ("arrived_scene_at", &f.arrived_scene_at),
        ("departed_scene_at", &f.departed_scene_at),
        ("arrived_hospital_at", &f.arrived_hospital_at),
        ("patient_name", &f.patient_name),
        ("patient_address", &f.patient_address),
        ("patient_contact", &f.patient_contact),
        ("next_of_kin", &f.next_of_kin),
        ("next_of_kin_contact", &f.next_of_kin_contact),
        ("blood_pressure", &f.blood_pressure),
        ("team_leader", &f.team_leader),
        ("vehicle_number", &f.vehicle_number),
        ("receiving_hospital", &f.receiving_hospital),
        ("receiving_personnel", &f.receiving_personnel),
    ];
    for (name, value) in short_text {
        check_len(name, value, MAX_SHORT_TEXT_LEN, errors);
    }

    let long_text = [
        ("chief_complaint", &f.chief_complaint),
        ("allergies", &f.allergies),
        ("medications", &f.medications),
        ("medical_history", &f.medical_history),
        ("medications_given", &f.medications_given),
        ("care_notes", &f.care_notes),
        ("endorsement_notes", &f.endorsement_notes),
    ];
    for (name, value) in long_text {
        check_len(name, value, MAX_LONG_TEXT_LEN, errors);
    }

    let groups = [
        ("level_of_consciousness", &f.level_of_consciousness),
        ("airway_status", &f.airway_status),
        ("breathing_status", &f.breathing_status),
        ("circulation_status", &f.circulation_status),
        ("interventions", &f.interventions),
        ("team_members", &f.team_members),
    ];
    for (name, items) in groups {
        if items.len() > MAX_CHECKBOX_ITEMS {
            errors.push(FieldError::new(
                name,
                format!("at most {MAX_CHECKBOX_ITEMS} selections allowed"),
            ));
        }
        if items.iter().any(|i| i.chars().count() > MAX_SHORT_TEXT_LEN) {
            errors.push(FieldError::new(
                name,
                format!("entries must be at most {MAX_SHORT_TEXT_LEN} characters"),
            ));
        }
    }

    check_range("patient_age", f.patient_age, &AGE_RANGE, errors);
    check_range("pulse_rate", f.pulse_rate, &PULSE_RANGE, errors);
    check_range("respiratory_rate", f.respiratory_rate, &RESPIRATORY_RANGE, errors);
    check_range("oxygen_saturation", f.oxygen_saturation, &SPO2_RANGE, errors);
    check_range("gcs_score", f.gcs_score, &GCS_RANGE, errors);
    check_range("pain_score", f.pain_score, &PAIN_RANGE, errors);
    check_float_range("temperature_c", f.temperature_c, &TEMPERATURE_RANGE, errors);
    check_float_range("blood_glucose", f.blood_glucose, &GLUCOSE_RANGE, errors);

    if let Some(bp) = &f.blood_pressure
        && parse_blood_pressure(bp).is_none()
    {
        errors.push(FieldError::new(
            "blood_pressure",
            "must look like systolic/diastolic, e.g. 120/80",
        ));
    }
}

/// Parse a `systolic/diastolic` reading.
pub fn parse_blood_pressure(value: &str) -> Option<(u32, u32)> {
    let (systolic, diastolic) = value.split_once('/')?;
    let systolic: u32 = systolic.trim().parse().ok()?;
    let diastolic: u32 = diastolic.trim().parse().ok()?;
    if (1..=400).contains(&systolic) && (1..=300).contains(&diastolic) {
        Some((systolic, diastolic))
    } else {
        None
    }
}

fn check_len(name: &str, value: &Option<String>, max: usize, errors: &mut Vec<FieldError>) {
    if let Some(v) = value
        && v.chars().count() > max
    {
        errors.push(FieldError::new(name, format!("must be at most {max} characters")));
    }
}

fn check_range(
    name: &str,
    value: Option<u32>,
    range: &RangeInclusive<u32>,
    errors: &mut Vec<FieldError>,
) {
    if let Some(v) = value
        && !range.contains(&v)
    {
        errors.push(FieldError::new(
            name,
            format!("must be between {} and {}", range.start(), range.end()),
        ));
    }
}

fn check_float_range(
    name: &str,
    value: Option<f64>,
    range: &RangeInclusive<f64>,
    errors: &mut Vec<FieldError>,
) {
    if let Some(v) = value
        && !(v.is_finite() && range.contains(&v))
    {
        errors.push(FieldError::new(
            name,
            format!("must be between {} and {}", range.start(), range.end()),
        ));
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

fn normalize(f: FormFields) -> FormFields {
    FormFields {
        incident_date: f.incident_date,
        incident_time: clean(f.incident_time),
        incident_location: clean(f.incident_location),
        nature_of_call: clean(f.nature_of_call),
        call_received_at: clean(f.call_received_at),
        arrived_scene_at: clean(f.arrived_scene_at),
        departed_scene_at: clean(f.departed_scene_at),
        arrived_hospital_at: clean(f.arrived_hospital_at),
        patient_name: clean(f.patient_name),
        patient_age: f.patient_age,
        patient_sex: f.patient_sex,
        patient_address: clean(f.patient_address),
        patient_contact: clean(f.patient_contact),
        next_of_kin: clean(f.next_of_kin),
        next_of_kin_contact: clean(f.next_of_kin_contact),
        blood_pressure: clean(f.blood_pressure),
        pulse_rate: f.pulse_rate,
        respiratory_rate: f.respiratory_rate,
        temperature_c: f.temperature_c,
        oxygen_saturation: f.oxygen_saturation,
        gcs_score: f.gcs_score,
        blood_glucose: f.blood_glucose,
        pain_score: f.pain_score,
        chief_complaint: clean(f.chief_complaint),
        level_of_consciousness: clean_list(f.level_of_consciousness),
        airway_status: clean_list(f.airway_status),
        breathing_status: clean_list(f.breathing_status),
        circulation_status: clean_list(f.circulation_status),
        allergies: clean(f.allergies),
        medications: clean(f.medications),
        medical_history: clean(f.medical_history),
        interventions: clean_list(f.interventions),
        medications_given: clean(f.medications_given),
        care_notes: clean(f.care_notes),
        team_leader: clean(f.team_leader),
        team_members: clean_list(f.team_members),
        vehicle_number: clean(f.vehicle_number),
        receiving_hospital: clean(f.receiving_hospital),
        receiving_personnel: clean(f.receiving_personnel),
        endorsement_notes: clean(f.endorsement_notes),
    }
}
