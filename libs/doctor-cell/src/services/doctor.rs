use async_trait::async_trait;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DatabaseError, Table};

use crate::models::{Doctor, DoctorError};

/// Lookup of doctors owned by the doctor management side of the clinic.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn get_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DoctorError>;

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError>;

    async fn require_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        self.get_doctor(doctor_id)
            .await?
            .ok_or_else(|| DoctorError::NotFound(doctor_id.to_string()))
    }
}

pub struct DoctorService {
    doctors: Table<Doctor>,
}

impl DoctorService {
    pub const TABLE: &'static str = "doctors";

    pub fn new(doctors: Table<Doctor>) -> Self {
        Self { doctors }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        Self::new(Table::in_memory(Self::TABLE, config.store_timeout()))
    }

    pub async fn open(config: &AppConfig) -> Result<Self, DatabaseError> {
        let table = Table::open_or_in_memory(
            Self::TABLE,
            config.table_path(Self::TABLE),
            config.store_timeout(),
        )
        .await?;
        Ok(Self::new(table))
    }

    /// Create or update a doctor record.
    pub async fn register_doctor(&self, doctor: Doctor) -> Result<Doctor, DoctorError> {
        if doctor.id.trim().is_empty() {
            return Err(DoctorError::ValidationError("Doctor id cannot be empty".to_string()));
        }
        if doctor.name.trim().is_empty() {
            return Err(DoctorError::ValidationError("Doctor name cannot be empty".to_string()));
        }

        let stored = self.doctors.upsert(doctor).await?;
        info!("Registered doctor {} ({})", stored.value.id, stored.value.specialization);
        Ok(stored.value)
    }
}

#[async_trait]
impl DoctorDirectory for DoctorService {
    async fn get_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);
        Ok(self.doctors.get_value(doctor_id).await?)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.doctors.scan(|_| true).await?)
    }
}
