//! Patient record — entity, editable draft, and partial update payload.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use super::{require, require_date};
use crate::collection::Resource;
use crate::editing::Draft;
use crate::error::ValidationError;

/// A patient as the clinic service owns it. The `id` is assigned by the
/// server and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    #[serde(default)]
    pub medical_history: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Display name, also the snapshot taken for appointment references.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Editable form state for a patient. Doubles as the create payload: the
/// form is submitted verbatim, with dates as typed (`YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub medical_history: String,
}

impl Default for PatientDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            date_of_birth: String::new(),
            // The gender select starts on a concrete choice, never blank.
            gender: Gender::Male,
            address: String::new(),
            medical_history: String::new(),
        }
    }
}

impl PatientDraft {
    /// The gender select supplies a typed value, not free text.
    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }
}

/// Free-text fields addressable by the form's single-field edit intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Address,
    MedicalHistory,
}

impl Draft for PatientDraft {
    type Entity = Patient;
    type Field = PatientField;

    fn from_entity(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            date_of_birth: patient.date_of_birth.format("%Y-%m-%d").to_string(),
            gender: patient.gender.clone(),
            address: patient.address.clone(),
            medical_history: patient.medical_history.clone(),
        }
    }

    fn set_field(&mut self, field: PatientField, value: &str) {
        let slot = match field {
            PatientField::FirstName => &mut self.first_name,
            PatientField::LastName => &mut self.last_name,
            PatientField::Email => &mut self.email,
            PatientField::Phone => &mut self.phone,
            PatientField::DateOfBirth => &mut self.date_of_birth,
            PatientField::Address => &mut self.address,
            PatientField::MedicalHistory => &mut self.medical_history,
        };
        *slot = value.to_string();
    }
}

/// Partial update. `None` fields are omitted from the wire so the server
/// leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

impl Resource for Patient {
    type Draft = PatientDraft;
    type Patch = PatientPatch;

    const COLLECTION: &'static str = "patients";
    const LABEL: &'static str = "patient";

    fn id(&self) -> &str {
        &self.id
    }

    /// Search covers name and email, the fields staff look patients up by.
    fn matches(&self, needle: &str) -> bool {
        self.first_name.to_lowercase().contains(needle)
            || self.last_name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }

    fn validate(draft: &PatientDraft) -> Result<(), ValidationError> {
        require("first_name", &draft.first_name)?;
        require("last_name", &draft.last_name)?;
        require("email", &draft.email)?;
        require("phone", &draft.phone)?;
        require_date("date_of_birth", &draft.date_of_birth)?;
        require("address", &draft.address)?;
        Ok(())
    }

    fn full_patch(draft: &PatientDraft) -> PatientPatch {
        PatientPatch {
            first_name: Some(draft.first_name.clone()),
            last_name: Some(draft.last_name.clone()),
            email: Some(draft.email.clone()),
            phone: Some(draft.phone.clone()),
            date_of_birth: Some(draft.date_of_birth.clone()),
            gender: Some(draft.gender.clone()),
            address: Some(draft.address.clone()),
            medical_history: Some(draft.medical_history.clone()),
        }
    }
}
