//! Local emulation of the clinic service.
//!
//! `InMemoryClinic` satisfies `CollectionTransport` for both collections
//! with the service's observable behavior: server-assigned uuid ids,
//! status/timestamp defaults on create, merge-only-supplied-fields on
//! update, 404 detail messages. `ScriptedAssistant` plays the chat side
//! with queued replies. Both support failure injection, which is what the
//! controller tests are built on.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{AssistantReply, AssistantTransport, CollectionTransport, GatewayError};
use crate::models::{
    Appointment, AppointmentDraft, AppointmentPatch, AppointmentStatus, Patient, PatientDraft,
    PatientPatch,
};

fn not_found(label: &str) -> GatewayError {
    // Capitalized like the service's own detail strings.
    let mut message = label.to_string();
    if let Some(first) = message.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    GatewayError::Status {
        status: 404,
        message: format!("{message} not found"),
    }
}

fn parse_wire_date(field: &str, value: &str) -> Result<NaiveDate, GatewayError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| GatewayError::Status {
        status: 422,
        message: format!("Invalid {field}: {value}"),
    })
}

/// In-memory stand-in for the remote collection service.
#[derive(Default)]
pub struct InMemoryClinic {
    patients: Mutex<Vec<Patient>>,
    appointments: Mutex<Vec<Appointment>>,
    fail_next: Mutex<Option<GatewayError>>,
}

impl InMemoryClinic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call (of any kind) fail with `err`.
    pub fn fail_next(&self, err: GatewayError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    fn take_failure(&self) -> Result<(), GatewayError> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn seed_patient(&self, patient: Patient) {
        self.patients.lock().unwrap().push(patient);
    }

    pub fn seed_appointment(&self, appointment: Appointment) {
        self.appointments.lock().unwrap().push(appointment);
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.patients.lock().unwrap().clone()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }
}

impl CollectionTransport<Patient> for InMemoryClinic {
    async fn list(&self) -> Result<Vec<Patient>, GatewayError> {
        self.take_failure()?;
        Ok(self.patients.lock().unwrap().clone())
    }

    async fn create(&self, fields: &PatientDraft) -> Result<Patient, GatewayError> {
        self.take_failure()?;
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4().to_string(),
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            date_of_birth: parse_wire_date("date_of_birth", &fields.date_of_birth)?,
            gender: fields.gender.clone(),
            address: fields.address.clone(),
            medical_history: fields.medical_history.clone(),
            created_at: now,
            updated_at: now,
        };
        self.patients.lock().unwrap().push(patient.clone());
        Ok(patient)
    }

    async fn update(&self, id: &str, fields: &PatientPatch) -> Result<Patient, GatewayError> {
        self.take_failure()?;
        let mut patients = self.patients.lock().unwrap();
        let patient = patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found("patient"))?;

        if let Some(v) = &fields.first_name {
            patient.first_name = v.clone();
        }
        if let Some(v) = &fields.last_name {
            patient.last_name = v.clone();
        }
        if let Some(v) = &fields.email {
            patient.email = v.clone();
        }
        if let Some(v) = &fields.phone {
            patient.phone = v.clone();
        }
        if let Some(v) = &fields.date_of_birth {
            patient.date_of_birth = parse_wire_date("date_of_birth", v)?;
        }
        if let Some(v) = &fields.gender {
            patient.gender = v.clone();
        }
        if let Some(v) = &fields.address {
            patient.address = v.clone();
        }
        if let Some(v) = &fields.medical_history {
            patient.medical_history = v.clone();
        }
        patient.updated_at = Utc::now();

        Ok(patient.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.take_failure()?;
        let mut patients = self.patients.lock().unwrap();
        let before = patients.len();
        patients.retain(|p| p.id != id);
        if patients.len() == before {
            return Err(not_found("patient"));
        }
        Ok(())
    }
}

impl CollectionTransport<Appointment> for InMemoryClinic {
    async fn list(&self) -> Result<Vec<Appointment>, GatewayError> {
        self.take_failure()?;
        Ok(self.appointments.lock().unwrap().clone())
    }

    async fn create(&self, fields: &AppointmentDraft) -> Result<Appointment, GatewayError> {
        self.take_failure()?;
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            patient_id: fields.patient_id().to_string(),
            patient_name: fields.patient_name().to_string(),
            doctor_name: fields.doctor_name.clone(),
            appointment_date: parse_wire_date("appointment_date", &fields.appointment_date)?,
            appointment_time: fields.appointment_time.clone(),
            reason: fields.reason.clone(),
            status: AppointmentStatus::Scheduled,
            notes: fields.notes.clone(),
            created_at: Utc::now(),
        };
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, id: &str, fields: &AppointmentPatch) -> Result<Appointment, GatewayError> {
        self.take_failure()?;
        let mut appointments = self.appointments.lock().unwrap();
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("appointment"))?;

        if let Some(v) = &fields.patient_id {
            appointment.patient_id = v.clone();
        }
        if let Some(v) = &fields.patient_name {
            appointment.patient_name = v.clone();
        }
        if let Some(v) = &fields.doctor_name {
            appointment.doctor_name = v.clone();
        }
        if let Some(v) = &fields.appointment_date {
            appointment.appointment_date = parse_wire_date("appointment_date", v)?;
        }
        if let Some(v) = &fields.appointment_time {
            appointment.appointment_time = v.clone();
        }
        if let Some(v) = &fields.reason {
            appointment.reason = v.clone();
        }
        if let Some(v) = &fields.status {
            appointment.status = v.clone();
        }
        if let Some(v) = &fields.notes {
            appointment.notes = v.clone();
        }

        Ok(appointment.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        self.take_failure()?;
        let mut appointments = self.appointments.lock().unwrap();
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        if appointments.len() == before {
            return Err(not_found("appointment"));
        }
        Ok(())
    }
}

/// A request the scripted assistant has seen, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// Assistant double with queued replies.
///
/// Echoes the caller's session identifier, or mints one on the first turn
/// the way the real service does. `force_session` makes it misbehave for
/// protocol-violation tests.
pub struct ScriptedAssistant {
    minted_session: String,
    forced_session: Mutex<Option<String>>,
    replies: Mutex<VecDeque<String>>,
    fail_next: Mutex<Option<GatewayError>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::with_session(&Uuid::new_v4().to_string())
    }

    pub fn with_session(session: &str) -> Self {
        Self {
            minted_session: session.to_string(),
            forced_session: Mutex::new(None),
            replies: Mutex::new(VecDeque::new()),
            fail_next: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn enqueue_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(text.to_string());
    }

    /// Make the next send fail with `err`.
    pub fn fail_next(&self, err: GatewayError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Answer every subsequent turn with `session` regardless of what the
    /// caller holds.
    pub fn force_session(&self, session: &str) {
        *self.forced_session.lock().unwrap() = Some(session.to_string());
    }

    /// Everything sent so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantTransport for ScriptedAssistant {
    async fn send(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<AssistantReply, GatewayError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            message: message.to_string(),
            session_id: session_id.map(str::to_string),
        });

        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        let session_id = self
            .forced_session
            .lock()
            .unwrap()
            .clone()
            .or_else(|| session_id.map(str::to_string))
            .unwrap_or_else(|| self.minted_session.clone());

        let response = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Please discuss the details with your doctor.".to_string());

        Ok(AssistantReply {
            response,
            session_id,
        })
    }
}
