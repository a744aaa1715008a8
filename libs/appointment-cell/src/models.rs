use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_database::{DatabaseError, Record};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    /// Clinic-local date and time-of-day of the slot.
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.scheduled_at.time()
    }

    /// Active appointments occupy their slot.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

impl Record for Appointment {
    fn key(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Rescheduled,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The doctor has not published this slot.
    NotStaffed,
    /// An active appointment already holds this slot.
    AlreadyBooked,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NotStaffed => write!(f, "not_staffed"),
            UnavailableReason::AlreadyBooked => write!(f, "already_booked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityCheck {
    pub doctor_id: String,
    pub scheduled_at: NaiveDateTime,
    pub available: bool,
    pub reason: Option<UnavailableReason>,
    pub conflicting_appointment_id: Option<String>,
}

impl AvailabilityCheck {
    pub fn available(doctor_id: &str, scheduled_at: NaiveDateTime) -> Self {
        Self {
            doctor_id: doctor_id.to_string(),
            scheduled_at,
            available: true,
            reason: None,
            conflicting_appointment_id: None,
        }
    }

    pub fn unavailable(
        doctor_id: &str,
        scheduled_at: NaiveDateTime,
        reason: UnavailableReason,
        conflicting_appointment_id: Option<String>,
    ) -> Self {
        Self {
            doctor_id: doctor_id.to_string(),
            scheduled_at,
            available: false,
            reason: Some(reason),
            conflicting_appointment_id,
        }
    }

    /// Turn a negative result into `SlotUnavailable`.
    pub fn ensure_available(self) -> Result<Self, AppointmentError> {
        match self.reason {
            None => Ok(self),
            Some(reason) => Err(AppointmentError::SlotUnavailable {
                reason,
                conflicting_appointment_id: self.conflicting_appointment_id,
            }),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub scheduled_at: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub scheduled_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: usize,
    pub scheduled: usize,
    pub rescheduled: usize,
    pub cancelled: usize,
}

const INSTANT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a clinic-local instant such as `2024-01-10T09:00` or `2024-01-10 09:00`.
pub fn parse_instant(raw: &str) -> Result<NaiveDateTime, AppointmentError> {
    let raw = raw.trim();
    INSTANT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            AppointmentError::InvalidSlot(format!(
                "'{}' is not a valid date and time (expected YYYY-MM-DDTHH:MM)",
                raw
            ))
        })
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    #[error("Slot unavailable: {reason}")]
    SlotUnavailable {
        reason: UnavailableReason,
        conflicting_appointment_id: Option<String>,
    },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment id already exists: {0}")]
    DuplicateId(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppointmentError {
    /// Infrastructure faults a caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppointmentError::ConcurrentModification(_) | AppointmentError::StorageUnavailable(_)
        )
    }
}

impl From<DatabaseError> for AppointmentError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { key, .. } => AppointmentError::NotFound(key),
            DatabaseError::DuplicateKey { key, .. } => AppointmentError::DuplicateId(key),
            DatabaseError::VersionConflict { .. } => {
                AppointmentError::ConcurrentModification(err.to_string())
            }
            DatabaseError::Timeout { .. }
            | DatabaseError::Io(_)
            | DatabaseError::Serialization(_) => {
                AppointmentError::StorageUnavailable(err.to_string())
            }
        }
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(id) => AppointmentError::DoctorNotFound(id),
            DoctorError::InvalidTimeSlot(msg) | DoctorError::ValidationError(msg) => {
                AppointmentError::InvalidSlot(msg)
            }
            DoctorError::Database(db) => db.into(),
        }
    }
}
