#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use appointment_cell::models::parse_instant;
use appointment_cell::router::AppointmentCellState;
use appointment_cell::services::{
    AppointmentBookingService, AppointmentLedger, AppointmentReportingService,
    TableAppointmentLedger,
};
use doctor_cell::models::Doctor;
use doctor_cell::services::{DoctorService, ScheduleService};
use patient_cell::models::Patient;
use patient_cell::services::PatientService;
use shared_config::AppConfig;

pub struct TestClinic {
    pub config: AppConfig,
    pub doctors: Arc<DoctorService>,
    pub schedules: Arc<ScheduleService>,
    pub patients: Arc<PatientService>,
    pub ledger: Arc<TableAppointmentLedger>,
    pub booking: Arc<AppointmentBookingService>,
    pub reporting: Arc<AppointmentReportingService>,
}

impl TestClinic {
    pub fn state(&self) -> Arc<AppointmentCellState> {
        Arc::new(AppointmentCellState {
            booking: self.booking.clone(),
            reporting: self.reporting.clone(),
        })
    }
}

pub fn at(raw: &str) -> NaiveDateTime {
    parse_instant(raw).expect("Invalid test instant")
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("Invalid test date")
}

pub fn time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").expect("Invalid test time")
}

fn patient(id: &str, first_name: &str, last_name: &str) -> Patient {
    Patient {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        date_of_birth: date("1985-03-22"),
        phone: "555-0100".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        insurance_provider: None,
        primary_doctor: Some("D1".to_string()),
    }
}

/// D1 open at 09:00 and 09:30 on 2024-01-10, patients P1 and P2.
pub async fn clinic() -> TestClinic {
    clinic_with(AppConfig::default(), Arc::new(TableAppointmentLedger::in_memory(&AppConfig::default()))).await
}

pub async fn clinic_with(config: AppConfig, ledger: Arc<TableAppointmentLedger>) -> TestClinic {
    let doctors = Arc::new(DoctorService::in_memory(&config));
    doctors
        .register_doctor(Doctor {
            id: "D1".to_string(),
            name: "Dr. Alice Johnson".to_string(),
            specialization: "Cardiology".to_string(),
            contact_info: Some("555-9876".to_string()),
        })
        .await
        .expect("Failed to register doctor");

    let schedules = Arc::new(ScheduleService::in_memory(doctors.clone(), &config));
    schedules
        .publish_slots("D1", date("2024-01-10"), vec![time("09:00"), time("09:30")])
        .await
        .expect("Failed to publish schedule");

    let patients = Arc::new(PatientService::in_memory(&config));
    for (id, first, last) in [("P1", "John", "Doe"), ("P2", "Jane", "Smith")] {
        patients
            .register_patient(patient(id, first, last))
            .await
            .expect("Failed to register patient");
    }

    let ledger_dyn: Arc<dyn AppointmentLedger> = ledger.clone();
    let booking = Arc::new(AppointmentBookingService::new(
        patients.clone(),
        schedules.clone(),
        ledger_dyn.clone(),
        &config,
    ));
    let reporting = Arc::new(AppointmentReportingService::new(ledger_dyn));

    TestClinic {
        config,
        doctors,
        schedules,
        patients,
        ledger,
        booking,
        reporting,
    }
}
