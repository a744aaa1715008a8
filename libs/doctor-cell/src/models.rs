use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::{DatabaseError, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub contact_info: Option<String>,
}

impl Record for Doctor {
    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Published, nominally open slots for one doctor on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub slots: BTreeSet<NaiveTime>,
}

impl ScheduleEntry {
    pub fn storage_key(doctor_id: &str, date: NaiveDate) -> String {
        format!("{}|{}", doctor_id, date)
    }

    pub fn open_slots(&self) -> Vec<NaiveTime> {
        self.slots.iter().copied().collect()
    }
}

impl Record for ScheduleEntry {
    fn key(&self) -> String {
        Self::storage_key(&self.doctor_id, self.date)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishScheduleRequest {
    pub date: NaiveDate,
    pub slots: Vec<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub doctor: Doctor,
    pub date: NaiveDate,
    pub slot_minutes: u32,
    pub open_slots: Vec<NaiveTime>,
}

// Error types specific to doctor operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoctorError {
    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Invalid time slot: {0}")]
    InvalidTimeSlot(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
