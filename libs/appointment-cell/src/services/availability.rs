use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use doctor_cell::services::ScheduleStore;
use shared_config::SlotGranularity;

use crate::models::{AppointmentError, AvailabilityCheck, UnavailableReason};
use crate::services::ledger::AppointmentLedger;

/// Live bookability of a (doctor, instant) pair, computed from the published
/// schedule and the active appointments in the ledger.
pub struct AvailabilityResolver {
    schedules: Arc<dyn ScheduleStore>,
    ledger: Arc<dyn AppointmentLedger>,
}

impl AvailabilityResolver {
    pub fn new(schedules: Arc<dyn ScheduleStore>, ledger: Arc<dyn AppointmentLedger>) -> Self {
        Self { schedules, ledger }
    }

    pub fn granularity(&self) -> SlotGranularity {
        self.schedules.granularity()
    }

    /// Only malformed input and unknown doctors are errors. An occupied or
    /// unstaffed slot is reported in the result. `exclude_appointment_id` is
    /// ignored when scanning for collisions, so an appointment never conflicts
    /// with itself.
    pub async fn check(
        &self,
        doctor_id: &str,
        scheduled_at: NaiveDateTime,
        exclude_appointment_id: Option<&str>,
    ) -> Result<AvailabilityCheck, AppointmentError> {
        debug!("Checking availability for doctor {} at {}", doctor_id, scheduled_at);

        let granularity = self.granularity();
        if !granularity.is_aligned(scheduled_at.time()) {
            warn!("Misaligned slot requested for doctor {}: {}", doctor_id, scheduled_at);
            return Err(AppointmentError::InvalidSlot(format!(
                "{} is not aligned to {}-minute slots",
                scheduled_at.format("%Y-%m-%d %H:%M:%S"),
                granularity.minutes()
            )));
        }

        let date = scheduled_at.date();
        let open_slots = self.schedules.get_open_slots(doctor_id, date).await?;
        if !open_slots.contains(&scheduled_at.time()) {
            return Ok(AvailabilityCheck::unavailable(
                doctor_id,
                scheduled_at,
                UnavailableReason::NotStaffed,
                None,
            ));
        }

        let active = self.ledger.list_by_doctor_and_date(doctor_id, date, true).await?;
        let conflict = active.iter().find(|appointment| {
            appointment.scheduled_at == scheduled_at
                && Some(appointment.id.as_str()) != exclude_appointment_id
        });

        Ok(match conflict {
            Some(existing) => {
                debug!("Slot {} for doctor {} held by {}", scheduled_at, doctor_id, existing.id);
                AvailabilityCheck::unavailable(
                    doctor_id,
                    scheduled_at,
                    UnavailableReason::AlreadyBooked,
                    Some(existing.id.clone()),
                )
            }
            None => AvailabilityCheck::available(doctor_id, scheduled_at),
        })
    }

    /// Published slots on `date` that no active appointment holds.
    pub async fn available_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let open_slots = self.schedules.get_open_slots(doctor_id, date).await?;
        let booked: Vec<NaiveTime> = self
            .ledger
            .list_by_doctor_and_date(doctor_id, date, true)
            .await?
            .iter()
            .map(|appointment| appointment.time())
            .collect();

        Ok(open_slots
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect())
    }
}
