//! Appointment record — entity, editable draft, and partial update payload.
//!
//! An appointment holds a `patient_id` reference plus a `patient_name`
//! snapshot taken when the patient was selected. The snapshot is a
//! point-in-time copy, not a live join: the booking keeps the name the
//! patient had at booking time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;
use super::patient::Patient;
use super::{require, require_date, require_time};
use crate::collection::Resource;
use crate::editing::Draft;
use crate::error::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    /// Wall-clock slot as entered, `HH:MM`.
    pub appointment_time: String,
    pub reason: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Editable form state for an appointment; also the create payload.
///
/// The patient reference is deliberately not field-addressable:
/// `select_patient` is the only way to set it, so `patient_id` and the
/// `patient_name` snapshot can never disagree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentDraft {
    patient_id: String,
    patient_name: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: String,
    pub notes: String,
}

impl AppointmentDraft {
    /// Point the draft at a patient, snapshotting their current name.
    pub fn select_patient(&mut self, patient: &Patient) {
        self.patient_id = patient.id.clone();
        self.patient_name = patient.full_name();
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }
}

/// Free-text fields addressable by the form's single-field edit intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    DoctorName,
    Date,
    Time,
    Reason,
    Notes,
}

impl Draft for AppointmentDraft {
    type Entity = Appointment;
    type Field = AppointmentField;

    fn from_entity(appointment: &Appointment) -> Self {
        Self {
            patient_id: appointment.patient_id.clone(),
            patient_name: appointment.patient_name.clone(),
            doctor_name: appointment.doctor_name.clone(),
            appointment_date: appointment.appointment_date.format("%Y-%m-%d").to_string(),
            appointment_time: appointment.appointment_time.clone(),
            reason: appointment.reason.clone(),
            notes: appointment.notes.clone(),
        }
    }

    fn set_field(&mut self, field: AppointmentField, value: &str) {
        let slot = match field {
            AppointmentField::DoctorName => &mut self.doctor_name,
            AppointmentField::Date => &mut self.appointment_date,
            AppointmentField::Time => &mut self.appointment_time,
            AppointmentField::Reason => &mut self.reason,
            AppointmentField::Notes => &mut self.notes,
        };
        *slot = value.to_string();
    }
}

/// Partial update. `None` fields are omitted from the wire so the server
/// leaves them untouched; a status flip travels alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// Status-select flow: update the status and nothing else.
    pub fn status_only(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Resource for Appointment {
    type Draft = AppointmentDraft;
    type Patch = AppointmentPatch;

    const COLLECTION: &'static str = "appointments";
    const LABEL: &'static str = "appointment";

    fn id(&self) -> &str {
        &self.id
    }

    /// Search covers who the appointment is for and about.
    fn matches(&self, needle: &str) -> bool {
        self.patient_name.to_lowercase().contains(needle)
            || self.doctor_name.to_lowercase().contains(needle)
            || self.reason.to_lowercase().contains(needle)
    }

    fn validate(draft: &AppointmentDraft) -> Result<(), ValidationError> {
        require("patient_id", &draft.patient_id)?;
        require("patient_name", &draft.patient_name)?;
        require("doctor_name", &draft.doctor_name)?;
        require_date("appointment_date", &draft.appointment_date)?;
        require_time("appointment_time", &draft.appointment_time)?;
        require("reason", &draft.reason)?;
        Ok(())
    }

    /// Edit-form submit: every form field travels; status is not on the
    /// form, so it stays untouched server-side.
    fn full_patch(draft: &AppointmentDraft) -> AppointmentPatch {
        AppointmentPatch {
            patient_id: Some(draft.patient_id.clone()),
            patient_name: Some(draft.patient_name.clone()),
            doctor_name: Some(draft.doctor_name.clone()),
            appointment_date: Some(draft.appointment_date.clone()),
            appointment_time: Some(draft.appointment_time.clone()),
            reason: Some(draft.reason.clone()),
            status: None,
            notes: Some(draft.notes.clone()),
        }
    }
}
