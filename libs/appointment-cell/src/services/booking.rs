use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use doctor_cell::services::ScheduleStore;
use patient_cell::models::PatientError;
use patient_cell::services::PatientDirectory;
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, AvailabilityCheck};
use crate::services::{
    availability::AvailabilityResolver,
    consistency::SchedulingConsistencyService,
    ledger::AppointmentLedger,
    lifecycle::AppointmentLifecycleService,
};

/// Entry point for booking, rescheduling and cancelling appointments.
pub struct AppointmentBookingService {
    patients: Arc<dyn PatientDirectory>,
    ledger: Arc<dyn AppointmentLedger>,
    resolver: AvailabilityResolver,
    lifecycle: AppointmentLifecycleService,
    consistency: SchedulingConsistencyService,
}

impl AppointmentBookingService {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        schedules: Arc<dyn ScheduleStore>,
        ledger: Arc<dyn AppointmentLedger>,
        config: &AppConfig,
    ) -> Self {
        Self {
            patients,
            resolver: AvailabilityResolver::new(schedules, ledger.clone()),
            ledger,
            lifecycle: AppointmentLifecycleService::new(),
            consistency: SchedulingConsistencyService::from_config(config),
        }
    }

    pub fn consistency(&self) -> &SchedulingConsistencyService {
        &self.consistency
    }

    /// Book a new appointment in an open, unoccupied slot.
    #[instrument(skip(self, notes))]
    pub async fn book(
        &self,
        patient_id: &str,
        doctor_id: &str,
        scheduled_at: NaiveDateTime,
        notes: &str,
    ) -> Result<Appointment, AppointmentError> {
        self.require_patient(patient_id).await?;

        let appointment = self
            .consistency
            .run_exclusive(doctor_id, "book", move |_| async move {
                self.resolver
                    .check(doctor_id, scheduled_at, None)
                    .await?
                    .ensure_available()
                    .inspect_err(|e| warn!("Booking rejected for doctor {} at {}: {}", doctor_id, scheduled_at, e))?;

                let now = Utc::now();
                let appointment = Appointment {
                    id: Uuid::new_v4().to_string(),
                    patient_id: patient_id.to_string(),
                    doctor_id: doctor_id.to_string(),
                    scheduled_at,
                    status: AppointmentStatus::Scheduled,
                    notes: notes.to_string(),
                    created_at: now,
                    updated_at: now,
                };

                self.ledger.insert(appointment).await
            })
            .await?;

        info!(
            "Appointment {} booked for patient {} with doctor {} at {}",
            appointment.id, patient_id, doctor_id, scheduled_at
        );
        Ok(appointment)
    }

    /// Move an active appointment to another slot of the same doctor.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        appointment_id: &str,
        new_scheduled_at: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let doctor_id = self.ledger.get(appointment_id).await?.doctor_id;

        let appointment = self
            .consistency
            .run_exclusive(&doctor_id, "reschedule", move |_| async move {
                let current = self.ledger.get_versioned(appointment_id).await?;
                self.lifecycle
                    .validate_status_transition(&current.value.status, &AppointmentStatus::Rescheduled)?;

                self.resolver
                    .check(&current.value.doctor_id, new_scheduled_at, Some(appointment_id))
                    .await?
                    .ensure_available()
                    .inspect_err(|e| warn!("Reschedule of {} to {} rejected: {}", appointment_id, new_scheduled_at, e))?;

                let updated = Appointment {
                    scheduled_at: new_scheduled_at,
                    status: AppointmentStatus::Rescheduled,
                    updated_at: Utc::now(),
                    ..current.value
                };

                Ok::<_, AppointmentError>(self.ledger.compare_and_update(updated, current.version).await?.value)
            })
            .await?;

        info!("Appointment {} rescheduled to {}", appointment_id, new_scheduled_at);
        Ok(appointment)
    }

    /// Cancel an active appointment. The instant and notes are kept.
    #[instrument(skip(self))]
    pub async fn cancel(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        let doctor_id = self.ledger.get(appointment_id).await?.doctor_id;

        let appointment = self
            .consistency
            .run_exclusive(&doctor_id, "cancel", move |_| async move {
                let current = self.ledger.get_versioned(appointment_id).await?;
                self.lifecycle
                    .validate_status_transition(&current.value.status, &AppointmentStatus::Cancelled)?;

                let cancelled = Appointment {
                    status: AppointmentStatus::Cancelled,
                    updated_at: Utc::now(),
                    ..current.value
                };

                Ok::<_, AppointmentError>(self.ledger.compare_and_update(cancelled, current.version).await?.value)
            })
            .await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        self.ledger.get(appointment_id).await
    }

    /// Unsynchronized read; the answer may be stale by the time a booking is attempted.
    pub async fn check_availability(
        &self,
        doctor_id: &str,
        scheduled_at: NaiveDateTime,
    ) -> Result<AvailabilityCheck, AppointmentError> {
        self.resolver.check(doctor_id, scheduled_at, None).await
    }

    pub async fn available_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        self.resolver.available_slots(doctor_id, date).await
    }

    async fn require_patient(&self, patient_id: &str) -> Result<(), AppointmentError> {
        match self.patients.get_patient(patient_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) | Err(PatientError::NotFound(_)) => {
                warn!("Booking rejected: unknown patient {}", patient_id);
                Err(AppointmentError::PatientNotFound(patient_id.to_string()))
            }
            Err(PatientError::Database(db)) => Err(db.into()),
            Err(other) => Err(AppointmentError::StorageUnavailable(format!(
                "Patient directory lookup failed: {}",
                other
            ))),
        }
    }
}
