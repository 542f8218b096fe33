//! Data model: server-owned entities, their editable drafts, and the
//! partial-update payloads that travel on the wire.

pub mod appointment;
pub mod enums;
pub mod patient;

pub use appointment::{Appointment, AppointmentDraft, AppointmentField, AppointmentPatch};
pub use enums::{AppointmentStatus, ChatRole, Gender};
pub use patient::{Patient, PatientDraft, PatientField, PatientPatch};

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;

/// Required-field check used by the draft validators.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Required `YYYY-MM-DD` field.
pub(crate) fn require_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    require(field, value)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Required `HH:MM` field.
pub(crate) fn require_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    require(field, value)?;
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ValidationError::InvalidField {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! Canonical records shared across module tests.

    use chrono::{NaiveDate, Utc};

    use super::enums::{AppointmentStatus, Gender};
    use super::{Appointment, Patient};

    pub fn patient(id: &str, first: &str, last: &str) -> Patient {
        Patient {
            id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
            email: format!(
                "{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            phone: "555-0142".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 12).unwrap(),
            gender: Gender::Female,
            address: "12 Garden Row".into(),
            medical_history: "Asthma, managed".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn appointment(id: &str, patient_id: &str) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: patient_id.into(),
            patient_name: "Amira Haddad".into(),
            doctor_name: "Dr. Varga".into(),
            appointment_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            appointment_time: "14:30".into(),
            reason: "Annual check-up".into(),
            status: AppointmentStatus::Scheduled,
            notes: "Bring previous lab results".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fixtures_are_internally_consistent() {
        let p = patient("p1", "Amira", "Haddad");
        let a = appointment("a1", "p1");
        assert_eq!(a.patient_id, p.id);
        assert_eq!(a.patient_name, p.full_name());
    }
}
