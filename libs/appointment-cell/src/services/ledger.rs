use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{DatabaseError, Table, Versioned};

use crate::models::{Appointment, AppointmentError};

/// Durable record of appointments and their status. Lists are ordered by
/// scheduled instant.
#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    async fn get_versioned(&self, appointment_id: &str) -> Result<Versioned<Appointment>, AppointmentError>;

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_by_doctor_and_date(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        active_only: bool,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, AppointmentError>;

    /// Fails with `DuplicateId` when the identifier is already taken.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    /// Replace the stored record. Fails with `NotFound` when absent.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    /// Replace the stored record only if it is still at `expected_version`.
    async fn compare_and_update(
        &self,
        appointment: Appointment,
        expected_version: u64,
    ) -> Result<Versioned<Appointment>, AppointmentError>;

    async fn get(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        Ok(self.get_versioned(appointment_id).await?.value)
    }
}

pub struct TableAppointmentLedger {
    appointments: Table<Appointment>,
}

impl TableAppointmentLedger {
    pub const TABLE: &'static str = "appointments";

    pub fn new(appointments: Table<Appointment>) -> Self {
        Self { appointments }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(Table::in_memory(Self::TABLE, config.store_timeout()))
    }

    /// Open the ledger from `DATA_DIR` when configured, otherwise in memory.
    pub async fn open(config: &AppConfig) -> Result<Self, DatabaseError> {
        let table = Table::open_or_in_memory(
            Self::TABLE,
            config.table_path(Self::TABLE),
            config.store_timeout(),
        )
        .await?;
        Ok(Self::new(table))
    }

    async fn scan_sorted<F>(&self, filter: F) -> Result<Vec<Appointment>, AppointmentError>
    where
        F: Fn(&Appointment) -> bool + Send,
    {
        let mut appointments = self.appointments.scan(filter).await?;
        appointments.sort_by(|a, b| {
            a.scheduled_at
                .cmp(&b.scheduled_at)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(appointments)
    }
}

#[async_trait]
impl AppointmentLedger for TableAppointmentLedger {
    async fn get_versioned(&self, appointment_id: &str) -> Result<Versioned<Appointment>, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        self.appointments
            .get(appointment_id)
            .await?
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.scan_sorted(|a| a.date() == date).await
    }

    async fn list_by_doctor_and_date(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        active_only: bool,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.scan_sorted(|a| {
            a.doctor_id == doctor_id && a.date() == date && (!active_only || a.is_active())
        })
        .await
    }

    async fn list_by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.scan_sorted(|a| a.patient_id == patient_id).await
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        Ok(self.appointments.insert(appointment).await?.value)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        Ok(self.appointments.replace(appointment, None).await?.value)
    }

    async fn compare_and_update(
        &self,
        appointment: Appointment,
        expected_version: u64,
    ) -> Result<Versioned<Appointment>, AppointmentError> {
        Ok(self.appointments.replace(appointment, Some(expected_version)).await?)
    }
}
