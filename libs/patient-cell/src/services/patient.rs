use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DatabaseError, Table};

use crate::models::{Patient, PatientError};

/// Lookup of patients owned by the patient management side of the clinic.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>, PatientError>;
}

pub struct PatientService {
    patients: Table<Patient>,
}

impl PatientService {
    pub const TABLE: &'static str = "patients";

    pub fn new(patients: Table<Patient>) -> Self {
        Self { patients }
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

    pub async fn register_patient(&self, patient: Patient) -> Result<Patient, PatientError> {
        if patient.id.trim().is_empty() {
            return Err(PatientError::ValidationError("Patient id cannot be empty".to_string()));
        }
        if patient.first_name.trim().is_empty() || patient.last_name.trim().is_empty() {
            return Err(PatientError::ValidationError("Patient name cannot be empty".to_string()));
        }
        if patient.date_of_birth > Utc::now().date_naive() {
            return Err(PatientError::InvalidDateOfBirth);
        }

        let stored = self.patients.upsert(patient).await?;
        info!("Registered patient {}", stored.value.id);
        Ok(stored.value)
    }
}

#[async_trait]
impl PatientDirectory for PatientService {
    async fn get_patient(&self, patient_id: &str) -> Result<Option<Patient>, PatientError> {
        debug!("Fetching patient: {}", patient_id);
        Ok(self.patients.get_value(patient_id).await?)
    }
}
