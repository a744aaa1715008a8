use std::sync::Arc;

use appointment_cell::router::AppointmentCellState;
use appointment_cell::services::{
    AppointmentBookingService, AppointmentLedger, AppointmentReportingService,
    TableAppointmentLedger,
};
use doctor_cell::router::DoctorCellState;
use doctor_cell::services::{DoctorService, ScheduleService};
use patient_cell::services::PatientService;
use shared_config::AppConfig;

/// Every service the API exposes, wired over the configured tables.
pub struct ClinicServices {
    pub doctors: Arc<DoctorService>,
    pub schedules: Arc<ScheduleService>,
    pub patients: Arc<PatientService>,
    pub booking: Arc<AppointmentBookingService>,
    pub reporting: Arc<AppointmentReportingService>,
}

impl ClinicServices {
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let doctors = Arc::new(DoctorService::open(config).await?);
        let schedules = Arc::new(ScheduleService::open(doctors.clone(), config).await?);
        let patients = Arc::new(PatientService::open(config).await?);
        let ledger: Arc<dyn AppointmentLedger> = Arc::new(TableAppointmentLedger::open(config).await?);

        let booking = Arc::new(AppointmentBookingService::new(
            patients.clone(),
            schedules.clone(),
            ledger.clone(),
            config,
        ));
        let reporting = Arc::new(AppointmentReportingService::new(ledger));

        Ok(Self {
            doctors,
            schedules,
            patients,
            booking,
            reporting,
        })
    }

    pub fn doctor_state(&self) -> Arc<DoctorCellState> {
        Arc::new(DoctorCellState {
            doctors: self.doctors.clone(),
            schedules: self.schedules.clone(),
        })
    }

    pub fn appointment_state(&self) -> Arc<AppointmentCellState> {
        Arc::new(AppointmentCellState {
            booking: self.booking.clone(),
            reporting: self.reporting.clone(),
        })
    }
}
