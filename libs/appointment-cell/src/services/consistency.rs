use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::AppointmentError;

const RETRY_BACKOFF_MS: u64 = 25;

/// Serializes state-changing operations per doctor.
///
/// Each doctor has its own async mutex. The read-check-write sequence of a
/// booking runs while holding it, and the final ledger write is additionally
/// guarded by the row version read under the same lock. Version conflicts are
/// retried a bounded number of times before surfacing.
///
/// A doctor's entry is dropped again once nobody holds or waits for it, so
/// made-up doctor ids cannot grow the lock map.
pub struct SchedulingConsistencyService {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
    max_write_retries: u32,
}

impl SchedulingConsistencyService {
    pub fn new(lock_timeout: Duration, max_write_retries: u32) -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
            lock_timeout,
            max_write_retries,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.lock_timeout(), config.max_write_retries)
    }

    /// Acquire the scheduling lock for a doctor, waiting at most `lock_timeout`.
    pub async fn acquire_doctor_lock(
        &self,
        doctor_id: &str,
    ) -> Result<DoctorLock<'_>, AppointmentError> {
        let lock = self.lock_entries().entry(doctor_id.to_string()).or_default().clone();

        match tokio::time::timeout(self.lock_timeout, lock.lock_owned()).await {
            Ok(guard) => {
                debug!("Acquired scheduling lock for doctor {}", doctor_id);
                Ok(DoctorLock {
                    service: self,
                    doctor_id: doctor_id.to_string(),
                    guard: Some(guard),
                })
            }
            Err(_) => {
                self.release(doctor_id);
                warn!(
                    "Timed out after {}ms waiting for scheduling lock on doctor {}",
                    self.lock_timeout.as_millis(),
                    doctor_id
                );
                Err(AppointmentError::ConcurrentModification(format!(
                    "Doctor {} is busy with another scheduling operation",
                    doctor_id
                )))
            }
        }
    }

    /// Number of doctors with a lock currently held or awaited.
    pub fn tracked_doctors(&self) -> usize {
        self.lock_entries().len()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, doctor_id: &str) {
        let mut locks = self.lock_entries();
        // Only the map's own reference left: no holder, no waiter.
        if locks.get(doctor_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(doctor_id);
        }
    }

    /// Run `attempt` inside the doctor's critical section, retrying on
    /// `ConcurrentModification` up to `max_write_retries` times.
    pub async fn run_exclusive<T, F, Fut>(
        &self,
        doctor_id: &str,
        operation: &str,
        mut attempt: F,
    ) -> Result<T, AppointmentError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AppointmentError>>,
    {
        let _guard = self.acquire_doctor_lock(doctor_id).await?;
        let max_attempts = self.max_write_retries + 1;

        let mut attempt_no = 1;
        loop {
            debug!("{} attempt {} for doctor {}", operation, attempt_no, doctor_id);

            match attempt(attempt_no).await {
                Ok(value) => return Ok(value),
                Err(AppointmentError::ConcurrentModification(reason)) if attempt_no < max_attempts => {
                    warn!(
                        "{} conflicted for doctor {} ({}), retrying attempt {}/{}",
                        operation, doctor_id, reason, attempt_no, max_attempts
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt_no as u64)).await;
                    attempt_no += 1;
                }
                Err(AppointmentError::ConcurrentModification(reason)) => {
                    warn!("{} for doctor {} gave up after {} attempts", operation, doctor_id, max_attempts);
                    return Err(AppointmentError::ConcurrentModification(format!(
                        "{} failed after {} attempts: {}",
                        operation, max_attempts, reason
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Held scheduling lock for one doctor.
pub struct DoctorLock<'a> {
    service: &'a SchedulingConsistencyService,
    doctor_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DoctorLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.service.release(&self.doctor_id);
    }
}
