use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GranularityError {
    #[error("Slot granularity must be a positive number of minutes")]
    Zero,

    #[error("Slot granularity of {0} minutes does not divide a day evenly")]
    Uneven(u32),
}

/// Length of one bookable slot.
///
/// The schedule store validates published slots against this value and the
/// availability resolver reads it back from the schedule store, so there is
/// exactly one granularity per running system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlotGranularity {
    minutes: u32,
}

impl SlotGranularity {
    pub const DEFAULT_MINUTES: u32 = 30;

    pub fn new(minutes: u32) -> Result<Self, GranularityError> {
        if minutes == 0 {
            return Err(GranularityError::Zero);
        }
        if MINUTES_PER_DAY % minutes != 0 {
            return Err(GranularityError::Uneven(minutes));
        }
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// True when `time` sits exactly on a slot boundary (no seconds, no sub-slot offset).
    pub fn is_aligned(&self, time: NaiveTime) -> bool {
        time.second() == 0
            && time.nanosecond() == 0
            && (time.hour() * 60 + time.minute()) % self.minutes == 0
    }

    /// Slot boundaries in `[start, end)`, beginning at the first boundary at or after `start`.
    pub fn slots_between(&self, start: NaiveTime, end: NaiveTime) -> Vec<NaiveTime> {
        let start_minute = start.hour() * 60 + start.minute() + u32::from(start.second() > 0);
        let end_minute = end.hour() * 60 + end.minute();
        let first = start_minute.div_ceil(self.minutes) * self.minutes;

        (first..end_minute)
            .step_by(self.minutes as usize)
            .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
            .collect()
    }
}

impl Default for SlotGranularity {
    fn default() -> Self {
        Self { minutes: Self::DEFAULT_MINUTES }
    }
}

impl TryFrom<u32> for SlotGranularity {
    type Error = GranularityError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl From<SlotGranularity> for u32 {
    fn from(granularity: SlotGranularity) -> Self {
        granularity.minutes
    }
}
