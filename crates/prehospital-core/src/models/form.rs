use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::injury::{InjuryListField, InjuryMarker};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FormStatus {
    Draft,
    #[default]
    Completed,
    Archived,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Completed => "completed",
            FormStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(FormStatus::Draft),
            "completed" => Ok(FormStatus::Completed),
            "archived" => Ok(FormStatus::Archived),
            other => Err(CoreError::InvalidEnum {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PatientSex {
    Male,
    Female,
    Unknown,
}

impl PatientSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientSex::Male => "male",
            PatientSex::Female => "female",
            PatientSex::Unknown => "unknown",
        }
    }
}

impl FromStr for PatientSex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(PatientSex::Male),
            "female" => Ok(PatientSex::Female),
            "unknown" => Ok(PatientSex::Unknown),
            other => Err(CoreError::InvalidEnum {
                field: "patient_sex",
                value: other.to_string(),
            }),
        }
    }
}

/// Every operator-editable field of a Pre-Hospital Care form.
///
/// Checkbox groups are lists of the selected option labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct FormFields {
    // Incident
    pub incident_date: Option<jiff::civil::Date>,
    pub incident_time: Option<String>,
    pub incident_location: Option<String>,
    pub nature_of_call: Option<String>,
    pub call_received_at: Option<String>,
    pub arrived_scene_at: Option<String>,
    pub departed_scene_at: Option<String>,
    pub arrived_hospital_at: Option<String>,

    // Patient
    pub patient_name: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_sex: Option<PatientSex>,
    pub patient_address: Option<String>,
    pub patient_contact: Option<String>,
    pub next_of_kin: Option<String>,
    pub next_of_kin_contact: Option<String>,

    // Vitals
    pub blood_pressure: Option<String>,
    pub pulse_rate: Option<u32>,
    pub respiratory_rate: Option<u32>,
    pub temperature_c: Option<f64>,
    pub oxygen_saturation: Option<u32>,
    pub gcs_score: Option<u32>,
    pub blood_glucose: Option<f64>,
    pub pain_score: Option<u32>,

    // Assessment
    pub chief_complaint: Option<String>,
    pub level_of_consciousness: Vec<String>,
    pub airway_status: Vec<String>,
    pub breathing_status: Vec<String>,
    pub circulation_status: Vec<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub medical_history: Option<String>,

    // Care given
    pub interventions: Vec<String>,
    pub medications_given: Option<String>,
    pub care_notes: Option<String>,

    // Endorsement
    pub team_leader: Option<String>,
    pub team_members: Vec<String>,
    pub vehicle_number: Option<String>,
    pub receiving_hospital: Option<String>,
    pub receiving_personnel: Option<String>,
    pub endorsement_notes: Option<String>,
}

/// A persisted form row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PrehospitalForm {
    pub id: i64,
    pub form_code: String,
    pub status: FormStatus,
    pub created_by: i64,
    #[serde(flatten)]
    pub fields: FormFields,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// A form together with its injury markers, ordered by injury number.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormRecord {
    #[serde(flatten)]
    pub form: PrehospitalForm,
    pub injuries: Vec<InjuryMarker>,
}

/// Body of a create or update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormSubmission {
    #[serde(default)]
    pub status: Option<FormStatus>,
    #[serde(flatten)]
    pub fields: FormFields,
    #[serde(default)]
    pub injuries: InjuryListField,
}

/// A submission that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub status: FormStatus,
    pub fields: FormFields,
    pub injuries: Vec<InjuryMarker>,
}

/// One row of the records list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormSummary {
    pub id: i64,
    pub form_code: String,
    pub status: FormStatus,
    pub patient_name: Option<String>,
    pub incident_date: Option<jiff::civil::Date>,
    pub incident_location: Option<String>,
    pub created_by: i64,
    pub created_by_name: String,
    pub injury_count: u32,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}
