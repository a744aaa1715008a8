use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, instrument, warn};

use shared_config::{AppConfig, SlotGranularity};
use shared_database::{DatabaseError, Table};

use crate::models::{DoctorError, DoctorSchedule, ScheduleEntry};
use crate::services::doctor::DoctorDirectory;

/// Authoritative source of which (doctor, date, time-of-day) slots are staffed,
/// independent of bookings.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Granularity every published slot is aligned to.
    fn granularity(&self) -> SlotGranularity;

    /// Open slots in ascending order. An unpublished date yields an empty list;
    /// only an unknown doctor is an error.
    async fn get_open_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, DoctorError>;
}

pub struct ScheduleService {
    doctors: Arc<dyn DoctorDirectory>,
    entries: Table<ScheduleEntry>,
    granularity: SlotGranularity,
}

impl ScheduleService {
    pub const TABLE: &'static str = "doctor_schedules";

    pub fn new(
        doctors: Arc<dyn DoctorDirectory>,
        entries: Table<ScheduleEntry>,
        granularity: SlotGranularity,
    ) -> Self {
        Self {
            doctors,
            entries,
            granularity,
        }
    }

    pub fn in_memory(doctors: Arc<dyn DoctorDirectory>, config: &AppConfig) -> Self {
        Self::new(
            doctors,
            Table::in_memory(Self::TABLE, config.store_timeout()),
            config.slot_granularity,
        )
    }

    pub async fn open(
        doctors: Arc<dyn DoctorDirectory>,
        config: &AppConfig,
    ) -> Result<Self, DatabaseError> {
        let entries = Table::open_or_in_memory(
            Self::TABLE,
            config.table_path(Self::TABLE),
            config.store_timeout(),
        )
        .await?;
        Ok(Self::new(doctors, entries, config.slot_granularity))
    }

    /// Replace the published slots for a doctor on a date.
    #[instrument(skip(self, slots))]
    pub async fn publish_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        slots: impl IntoIterator<Item = NaiveTime> + Send,
    ) -> Result<ScheduleEntry, DoctorError> {
        self.doctors.require_doctor(doctor_id).await?;

        let slots: BTreeSet<NaiveTime> = slots.into_iter().collect();
        if let Some(misaligned) = slots.iter().find(|slot| !self.granularity.is_aligned(**slot)) {
            warn!("Rejected schedule for doctor {} on {}: {} is misaligned", doctor_id, date, misaligned);
            return Err(DoctorError::InvalidTimeSlot(format!(
                "{} is not aligned to {}-minute slots",
                misaligned,
                self.granularity.minutes()
            )));
        }

        let entry = ScheduleEntry {
            doctor_id: doctor_id.to_string(),
            date,
            slots,
        };
        let stored = self.entries.upsert(entry).await?;

        info!("Published {} slots for doctor {} on {}", stored.value.slots.len(), doctor_id, date);
        Ok(stored.value)
    }

    /// Publish every slot boundary in `[start, end)`.
    pub async fn publish_working_hours(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<ScheduleEntry, DoctorError> {
        if start >= end {
            return Err(DoctorError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }

        let slots = self.granularity.slots_between(start, end);
        self.publish_slots(doctor_id, date, slots).await
    }

    pub async fn get_doctor_schedule(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<DoctorSchedule, DoctorError> {
        let doctor = self.doctors.require_doctor(doctor_id).await?;
        let open_slots = self.published_slots(doctor_id, date).await?;

        Ok(DoctorSchedule {
            doctor,
            date,
            slot_minutes: self.granularity.minutes(),
            open_slots,
        })
    }

    async fn published_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, DoctorError> {
        let key = ScheduleEntry::storage_key(doctor_id, date);
        Ok(self
            .entries
            .get_value(&key)
            .await?
            .map(|entry| entry.open_slots())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ScheduleStore for ScheduleService {
    fn granularity(&self) -> SlotGranularity {
        self.granularity
    }

    async fn get_open_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, DoctorError> {
        debug!("Fetching open slots for doctor {} on {}", doctor_id, date);

        self.doctors.require_doctor(doctor_id).await?;
        self.published_slots(doctor_id, date).await
    }
}
