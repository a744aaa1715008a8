use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, DailySummary};
use crate::services::ledger::AppointmentLedger;

/// Read-only projections over the ledger. Results are ordered by instant and
/// include every status.
pub struct AppointmentReportingService {
    ledger: Arc<dyn AppointmentLedger>,
}

impl AppointmentReportingService {
    pub fn new(ledger: Arc<dyn AppointmentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments on {}", date);
        self.ledger.list_by_date(date).await
    }

    pub async fn appointments_for_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for patient {}", patient_id);
        self.ledger.list_by_patient(patient_id).await
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.ledger.list_by_doctor_and_date(doctor_id, date, false).await
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, AppointmentError> {
        let appointments = self.ledger.list_by_date(date).await?;
        let count = |status: AppointmentStatus| {
            appointments.iter().filter(|a| a.status == status).count()
        };

        Ok(DailySummary {
            date,
            total: appointments.len(),
            scheduled: count(AppointmentStatus::Scheduled),
            rescheduled: count(AppointmentStatus::Rescheduled),
            cancelled: count(AppointmentStatus::Cancelled),
        })
    }
}
